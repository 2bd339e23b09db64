use crate::*;

fn ejb(actions: &str) -> EjbMethodPermission {
    EjbMethodPermission::new("Bean", actions).unwrap()
}

#[test]
fn test_unspecified_params_match_any() {
    let granted = ejb("foo,Remote");
    let request = ejb("foo,Remote,int");
    assert!(granted.implies(&request));
    assert!(!request.implies(&granted));
}

#[test]
fn test_each_field_filters() {
    let request = ejb("foo,Local,java.lang.String,int[]");

    assert!(ejb("").implies(&request));
    assert!(ejb("foo").implies(&request));
    assert!(ejb(",Local").implies(&request));
    assert!(ejb(",,java.lang.String,int[]").implies(&request));
    assert!(ejb("foo,,java.lang.String,int[]").implies(&request));

    assert!(!ejb("bar").implies(&request));
    assert!(!ejb(",Remote").implies(&request));
    assert!(!ejb(",,java.lang.String").implies(&request));
    assert!(!EjbMethodPermission::new("Other", "").unwrap().implies(&request));
}

#[test]
fn test_other_interface_compares_literally() {
    let granted = ejb("foo,MessageEndpoint");
    assert_eq!(
        granted.method_interface(),
        Some(&MethodInterface::Other("MessageEndpoint".to_string()))
    );
    assert!(granted.implies(&ejb("foo,MessageEndpoint,int")));
    assert!(!granted.implies(&ejb("foo,Timer")));
    assert!(!granted.implies(&ejb("foo")));
}

#[test]
fn test_parsing() {
    let p = ejb("foo,Home,int,java.lang.String");
    assert_eq!(p.method_name(), Some("foo"));
    assert_eq!(p.method_interface(), Some(&MethodInterface::Home));
    assert_eq!(p.method_params(), Some(vec!["int", "java.lang.String"]));

    let no_args = ejb("foo,,");
    assert_eq!(no_args.method_interface(), None);
    assert_eq!(no_args.method_params(), Some(vec![]));
    assert!(!no_args.implies(&ejb("foo,,int")));
    assert!(ejb("foo").implies(&no_args));

    let all = ejb("");
    assert_eq!(all.method_name(), None);
    assert_eq!(all.method_params(), None);
    assert_eq!(all.actions(), None);
}

#[test]
fn test_canonical_actions() {
    for actions in [
        "foo",
        "foo,Remote",
        "foo,Remote,int",
        ",Remote",
        ",Remote,int",
        ",,int",
        "foo,,int",
        "foo,,",
        ",,",
    ] {
        assert_eq!(ejb(actions).actions(), Some(actions), "{actions} is canonical");
    }
}

#[test]
fn test_invalid_actions() {
    assert_eq!(
        EjbMethodPermission::new("Bean", "foo,").unwrap_err(),
        PermissionError::InvalidEjbActions("foo,".to_string())
    );
    assert!(EjbMethodPermission::new("Bean", ",").is_err());
    assert_eq!(
        EjbMethodPermission::new("Bean", "foo,Remote,int,").unwrap_err(),
        PermissionError::InvalidMethodParam(",int,".to_string())
    );
}

#[test]
fn test_with_parts() {
    let p = EjbMethodPermission::with_parts("Bean", Some("foo"), Some("Remote"), Some(&["int", "long"][..])).unwrap();
    assert_eq!(p.actions(), Some("foo,Remote,int,long"));
    assert_eq!(p, ejb("foo,Remote,int,long"));

    let no_args = EjbMethodPermission::with_parts::<&str>("Bean", Some("foo"), None, Some(&[][..])).unwrap();
    assert_eq!(no_args.actions(), Some("foo,,"));

    let unspecified = EjbMethodPermission::with_parts::<&str>("Bean", Some(""), Some(""), None).unwrap();
    assert_eq!(unspecified.actions(), None);

    assert_eq!(
        EjbMethodPermission::with_parts::<&str>("Bean", Some("a,b"), None, None).unwrap_err(),
        PermissionError::InvalidMethodName("a,b".to_string())
    );
    assert_eq!(
        EjbMethodPermission::with_parts("Bean", None, None, Some(&["int,long"][..])).unwrap_err(),
        PermissionError::InvalidMethodParam("int,long".to_string())
    );
}

#[test]
fn test_from_signature_canonicalizes_arrays() {
    let method = MethodSignature::new(
        "transfer",
        vec![
            ParamType::scalar("long"),
            ParamType::array("java.lang.String", 1),
            ParamType::array("int", 3),
        ],
    );
    let p = EjbMethodPermission::from_signature("Bank", Some("Local"), &method).unwrap();
    assert_eq!(p.actions(), Some("transfer,Local,long,java.lang.String[],int[][][]"));
    assert_eq!(EjbMethodPermission::new("Bank", p.actions().unwrap()).unwrap(), p);

    let no_args = EjbMethodPermission::from_signature("Bank", None, &MethodSignature::new("ping", vec![])).unwrap();
    assert_eq!(no_args.actions(), Some("ping,,"));
}

#[test]
fn test_from_signature_rejects_commas() {
    let bad_name = MethodSignature::new("a,b", vec![ParamType::scalar("int")]);
    assert_eq!(
        EjbMethodPermission::from_signature("Bank", None, &bad_name).unwrap_err(),
        PermissionError::InvalidMethodName("a,b".to_string())
    );

    let bad_param = MethodSignature::new("transfer", vec![ParamType::array("Map<K,V>", 1)]);
    assert_eq!(
        EjbMethodPermission::from_signature("Bank", Some("Local"), &bad_param).unwrap_err(),
        PermissionError::InvalidMethodParam("Map<K,V>[]".to_string())
    );
}

#[test]
fn test_round_trip_and_equality() {
    for actions in ["", "dummyMethod,Home,String", ",,", "x,Custom,a[],b"] {
        let p = ejb(actions);
        let rebuilt = EjbMethodPermission::new(p.name(), p.actions().unwrap_or("")).unwrap();
        assert_eq!(rebuilt, p);
    }
    assert_ne!(ejb("foo"), ejb("foo,Remote"));
    assert_ne!(ejb("foo"), EjbMethodPermission::new("Other", "foo").unwrap());
}

#[test]
fn test_role_refs() {
    let web = WebRoleRefPermission::new("dummyResource", "dummyRole").unwrap();
    assert!(web.implies(&WebRoleRefPermission::new("dummyResource", "dummyRole").unwrap()));
    assert!(!web.implies(&WebRoleRefPermission::new("dummyResource", "other").unwrap()));
    assert_eq!(web.actions(), Some("dummyRole"));

    let ejb_ref = EjbRoleRefPermission::new("DummyEJB", "dummyRole").unwrap();
    assert!(ejb_ref.implies(&ejb_ref));
    assert_eq!(ejb_ref.to_string(), "(EJBRoleRefPermission \"DummyEJB\" \"dummyRole\")");

    assert!(matches!(
        EjbRoleRefPermission::new("DummyEJB", ""),
        Err(PermissionError::InvalidRoleRef(_))
    ));
}
