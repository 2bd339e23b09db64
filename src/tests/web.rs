use std::{
    collections::HashSet,
    hash::{DefaultHasher, Hash, Hasher},
};

use crate::*;

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn test_exception_list_end_to_end() {
    let granted = WebResourcePermission::new("/secured.jsp", "!GET,POST").unwrap();
    assert!(!granted.implies(&WebResourcePermission::new("/secured.jsp", "GET").unwrap()));
    assert!(granted.implies(&WebResourcePermission::new("/secured.jsp", "DELETE").unwrap()));
}

#[test]
fn test_default_pattern_with_exclusion_end_to_end() {
    let granted = WebResourcePermission::new("/:/secured.jsp", "GET").unwrap();
    assert!(granted.implies(&WebResourcePermission::new("/other.jsp", "GET").unwrap()));
    assert!(!granted.implies(&WebResourcePermission::new("/secured.jsp", "GET").unwrap()));
    assert!(!granted.implies(&WebResourcePermission::new("/other.jsp", "POST").unwrap()));
}

#[test]
fn test_both_components_must_imply() {
    let granted = WebResourcePermission::new("/app/*", "GET").unwrap();
    assert!(granted.implies(&WebResourcePermission::new("/app/page", "GET").unwrap()));
    assert!(!granted.implies(&WebResourcePermission::new("/other", "GET").unwrap()));
    assert!(!granted.implies(&WebResourcePermission::new("/app/page", "PUT").unwrap()));
    assert!(!granted.implies(&WebResourcePermission::new("/app/page", "").unwrap()));
}

#[test]
fn test_resource_round_trip() {
    for (name, actions) in [
        ("/dummyEntry", "POST"),
        ("/a/*:/a/b", "!GET,PATCH"),
        ("*.jsp", ""),
        ("", "GET,HEAD"),
    ] {
        let permission = WebResourcePermission::new(name, actions).unwrap();
        assert_eq!(permission.actions(), permission.actions());
        let rebuilt =
            WebResourcePermission::new(permission.name(), permission.actions().unwrap_or("")).unwrap();
        assert_eq!(rebuilt, permission);
        assert_eq!(hash_of(&rebuilt), hash_of(&permission));
    }
}

#[test]
fn test_resource_equality_is_canonical() {
    let a = WebResourcePermission::new("/:/b:/a", "POST,GET").unwrap();
    let b = WebResourcePermission::with_methods("/:/a:/b", &["GET", "POST"]).unwrap();
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    // The name is kept as given; equality uses the canonical spec.
    assert_eq!(a.name(), "/:/b:/a");
    assert_eq!(a.url_pattern_spec().canonical(), "/:/a:/b");
    assert_eq!(a.actions(), Some("GET,POST"));

    let set: HashSet<_> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn test_permission_string() {
    let permission = WebResourcePermission::new("/dummyEntry", "POST").unwrap();
    assert_eq!(permission.to_string(), "(WebResourcePermission \"/dummyEntry\" \"POST\")");
    let all = WebResourcePermission::new("/", "").unwrap();
    assert_eq!(all.to_string(), "(WebResourcePermission \"/\")");
}

#[test]
fn test_resource_construction_errors() {
    assert!(matches!(
        WebResourcePermission::new("/foo:/bar", "GET"),
        Err(PermissionError::InvalidUrlPatternSpec { .. })
    ));
    assert!(matches!(
        WebResourcePermission::new("/foo", "!"),
        Err(PermissionError::InvalidHttpMethodSpec(_))
    ));
}

#[test]
fn test_resource_from_request() {
    let request = http::Request::builder()
        .method("GET")
        .uri("http://example.com/shop/cart/view:all")
        .body(())
        .unwrap();
    let permission = WebResourcePermission::from_request(&HttpRequestTarget::new(&request, "/shop")).unwrap();
    assert_eq!(permission.name(), "/cart/view%3Aall");
    assert_eq!(permission.actions(), Some("GET"));

    let granted = WebResourcePermission::new("/cart/*", "GET,POST").unwrap();
    assert!(granted.implies(&permission));
}

#[test]
fn test_context_root_request_maps_to_empty_name() {
    let request = http::Request::builder().method("POST").uri("/shop/").body(()).unwrap();
    let permission = WebResourcePermission::from_request(&HttpRequestTarget::new(&request, "/shop")).unwrap();
    assert_eq!(permission.name(), "");
    assert!(WebResourcePermission::new("/", "POST").unwrap().implies(&permission));
    assert!(WebResourcePermission::new("/*", "").unwrap().implies(&permission));
}

#[test]
fn test_request_with_extension_method() {
    let factory = MethodSpecFactory::new();
    let request = http::Request::builder().method("PROPFIND").uri("/dav/file").body(()).unwrap();
    let permission =
        WebResourcePermission::from_request_in(&factory, &HttpRequestTarget::new(&request, "")).unwrap();
    assert_eq!(permission.name(), "/dav/file");
    assert_eq!(permission.actions(), Some("PROPFIND"));

    let granted = WebResourcePermission::new_in(&factory, "/dav/*", "!DELETE").unwrap();
    assert!(granted.implies(&permission));
}

#[test]
fn test_user_data_actions() {
    let p = WebUserDataPermission::new("/dummyResource.jsp", "GET,POST:CONFIDENTIAL").unwrap();
    assert_eq!(p.actions(), Some("GET,POST:CONFIDENTIAL"));
    assert_eq!(p.transport(), TransportType::Confidential);

    let none = WebUserDataPermission::new("/r", "POST,GET:NONE").unwrap();
    assert_eq!(none.actions(), Some("GET,POST"));
    assert_eq!(none, WebUserDataPermission::new("/r", "GET,POST").unwrap());

    let transport_only = WebUserDataPermission::new("/r", ":INTEGRAL").unwrap();
    assert_eq!(transport_only.actions(), Some(":INTEGRAL"));
    assert!(transport_only.method_spec().is_all());

    assert_eq!(WebUserDataPermission::new("/r", "").unwrap().actions(), None);
    assert_eq!(WebUserDataPermission::new("/r", ":NONE").unwrap().actions(), None);
}

#[test]
fn test_user_data_invalid_transport() {
    assert_eq!(
        WebUserDataPermission::new("/r", "GET:SECRET").unwrap_err(),
        PermissionError::InvalidTransportType("SECRET".to_string())
    );
    assert!(WebUserDataPermission::new("/r", "GET:").is_err());
}

#[test]
fn test_user_data_implication() {
    let confidential = WebUserDataPermission::new("/*", ":CONFIDENTIAL").unwrap();
    let any_transport = WebUserDataPermission::new("/*", "").unwrap();
    let request = WebUserDataPermission::new("/a", "GET:CONFIDENTIAL").unwrap();
    let insecure = WebUserDataPermission::new("/a", "GET").unwrap();

    assert!(confidential.implies(&request));
    assert!(!confidential.implies(&insecure));
    assert!(any_transport.implies(&request));
    assert!(any_transport.implies(&insecure));
    assert!(!WebUserDataPermission::new("/*", ":INTEGRAL").unwrap().implies(&request));
}

#[test]
fn test_user_data_with_methods_and_request() {
    let p = WebUserDataPermission::with_methods("/a/*", &["PUT", "GET"], Some(TransportType::Integral)).unwrap();
    assert_eq!(p.actions(), Some("GET,PUT:INTEGRAL"));
    let q = WebUserDataPermission::with_methods::<&str>("/a/*", &[], None).unwrap();
    assert_eq!(q.actions(), None);

    let request = http::Request::builder()
        .method("GET")
        .uri("https://example.com/app/a/b")
        .body(())
        .unwrap();
    let secure = WebUserDataPermission::from_request(&HttpRequestTarget::new(&request, "/app")).unwrap();
    assert_eq!(secure.name(), "/a/b");
    assert_eq!(secure.actions(), Some("GET:CONFIDENTIAL"));
    assert!(WebUserDataPermission::new("/a/*", "GET:CONFIDENTIAL").unwrap().implies(&secure));

    let plain_request = http::Request::builder().method("GET").uri("/app/a/b").body(()).unwrap();
    let plain = WebUserDataPermission::from_request(&HttpRequestTarget::new(&plain_request, "/app")).unwrap();
    assert_eq!(plain.transport(), TransportType::None);
    assert_eq!(plain.actions(), Some("GET"));
}

#[test]
fn test_user_data_round_trip() {
    for actions in ["", "GET", "!PUT:CONFIDENTIAL", ":INTEGRAL", "GET,PATCH:NONE"] {
        let permission = WebUserDataPermission::new("/x/*:/x/y", actions).unwrap();
        let rebuilt =
            WebUserDataPermission::new(permission.name(), permission.actions().unwrap_or("")).unwrap();
        assert_eq!(rebuilt, permission);
        assert_eq!(hash_of(&rebuilt), hash_of(&permission));
    }
}

#[test]
fn test_grant_and_request_from_different_factories() {
    let grants = MethodSpecFactory::new();
    let requests = MethodSpecFactory::new();

    let granted = WebResourcePermission::new_in(&grants, "/dav/*", "PATCH").unwrap();
    let requested = WebResourcePermission::new_in(&requests, "/dav/file", "PROPFIND").unwrap();
    assert!(!granted.implies(&requested));
    assert!(granted.implies(&WebResourcePermission::new_in(&requests, "/dav/file", "PATCH").unwrap()));

    // Deserialized grants use the default factory.
    let loaded: WebResourcePermission =
        serde_json::from_str(r#"{ "name": "/dav/*", "actions": "MKCOL" }"#).unwrap();
    let request = http::Request::builder().method("LOCK").uri("/dav/file").body(()).unwrap();
    let lock = WebResourcePermission::from_request_in(&requests, &HttpRequestTarget::new(&request, "")).unwrap();
    assert!(!loaded.implies(&lock));

    let request = http::Request::builder().method("MKCOL").uri("/dav/dir").body(()).unwrap();
    let mkcol = WebResourcePermission::from_request_in(&requests, &HttpRequestTarget::new(&request, "")).unwrap();
    assert!(loaded.implies(&mkcol));

    let user_data = WebUserDataPermission::new_in(&grants, "/dav/*", "!PATCH:CONFIDENTIAL").unwrap();
    assert!(user_data.implies(&WebUserDataPermission::new_in(&requests, "/dav/a", "PROPFIND:CONFIDENTIAL").unwrap()));
    assert!(!user_data.implies(&WebUserDataPermission::new_in(&requests, "/dav/a", "PATCH:CONFIDENTIAL").unwrap()));
}
