mod ejb;
mod web;
