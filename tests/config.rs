mod common;

use ed25519_dalek::SigningKey;
use grpcbridge::auth::PreProcessor;
use grpcbridge::config::{BridgeConfig, ConfigArgs, ScopeRule};
use grpcbridge::convert::{ConverterKind, EnumCase};
use grpcbridge::dispatch::{bind, Handlers, WireCall};
use grpcbridge::extract::extract_converters;
use grpcbridge::schema::SchemaIndex;
use grpcbridge::value::{message, Value};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tonic::Code;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn load(file: &NamedTempFile) -> BridgeConfig {
    BridgeConfig::load(&ConfigArgs {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_user_file_overrides_defaults() {
    let signing_key = SigningKey::from_bytes(&[5u8; 32]);
    let file = write_config(&format!(
        r#"
[auth]
allow_anonymous = true
verifying_key = "{}"
leeway_secs = 5

[[auth.rules]]
method = "/test.Service/TestEnums"
scopes = ["write:enums:*"]

[[enums]]
name = "AnEnum"
case = "lower"

[extract]
recursion_limit = 2

[logging]
level = "debug"
filter = "grpcbridge::dispatch=trace"
"#,
        hex::encode(signing_key.verifying_key().to_bytes())
    ));

    let config = load(&file);
    assert!(config.auth.allow_anonymous);
    assert_eq!(config.auth.leeway_secs, 5);
    assert!(config.auth.verifier().unwrap().is_some());
    assert_eq!(
        config.auth.rules,
        vec![ScopeRule {
            method: "/test.Service/TestEnums".into(),
            scopes: vec!["write:enums:*".into()],
        }]
    );
    assert_eq!(config.enum_naming().case_for("AnEnum"), EnumCase::Lower);
    assert_eq!(config.extract.recursion_limit, 2);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.filter.as_deref(), Some("grpcbridge::dispatch=trace"));
}

#[test]
fn test_missing_sections_keep_defaults() {
    let file = write_config("[logging]\nlevel = \"warn\"\n");
    let config = load(&file);
    assert!(!config.auth.allow_anonymous);
    assert_eq!(config.auth.leeway_secs, 60);
    assert_eq!(config.extract.recursion_limit, 3);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_malformed_file_is_an_error() {
    let file = write_config("[extract]\nrecursion_limit = \"many\"\n");
    let result = BridgeConfig::load(&ConfigArgs {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    });
    assert!(result.is_err());
}

#[tokio::test]
async fn test_configured_enum_case_applies_to_calls() {
    let file = write_config(
        "[[enums]]\nname = \"AnEnum\"\ncase = \"kebab\"\n\n[auth]\nallow_anonymous = true\n",
    );
    let config = load(&file);

    let set = common::descriptor_set();
    let index = config
        .schema_settings()
        .apply(SchemaIndex::from_file_descriptor_set(&set));

    let converters = extract_converters(index.message("Repeated").unwrap(), &index).unwrap();
    assert_eq!(
        converters[0].kind(),
        ConverterKind::Enum {
            name: "AnEnum".into()
        }
    );

    let authorization: Arc<dyn PreProcessor> = Arc::new(config.auth.authorization().unwrap());
    let handlers = Handlers::new().with(
        "TestRepeated",
        grpcbridge::handler_fn(|_ctx, request: grpcbridge::Message| async move {
            assert_eq!(request["enum"], Value::from(vec!["good", "bad"]));
            Ok::<_, grpcbridge::Error>(Some(message([("enum", Value::from(vec!["bad"]))])))
        }),
    );
    let service = bind(&common::service(&set), &handlers, vec![authorization], &index).unwrap();

    let response = service
        .method("TestRepeated")
        .unwrap()
        .call(WireCall::new(message([(
            "enum",
            Value::from(vec!["AN_ENUM_GOOD", "AN_ENUM_BAD"]),
        )])))
        .await
        .unwrap();
    assert_eq!(response["enum"], Value::from(vec!["AN_ENUM_BAD"]));
}

#[tokio::test]
async fn test_configured_scopes_are_enforced() {
    let file = write_config(
        "[auth]\nallow_anonymous = true\n\n[[auth.rules]]\nmethod = \"/test.Service/TestBigInts\"\nscopes = [\"read:bigints:*\"]\n",
    );
    let config = load(&file);

    let set = common::descriptor_set();
    let index = SchemaIndex::from_file_descriptor_set(&set);
    let authorization: Arc<dyn PreProcessor> = Arc::new(config.auth.authorization().unwrap());
    let service = bind(&common::service(&set), &Handlers::new(), vec![authorization], &index).unwrap();

    let status = service
        .method("TestBigInts")
        .unwrap()
        .call(WireCall::default())
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::PermissionDenied);
}
