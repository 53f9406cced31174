//! Shared schema fixture for the integration tests.
//!
//! Package `test` declares messages whose short names collide across scopes
//! (`ServiceMessage.D` vs top-level `D`) and whose fields refer to nested
//! types by relative name, plus a `Service` with one method per concern.

#![allow(dead_code)]

use grpcbridge::dispatch::ServiceDefinition;
use grpcbridge::value::{message, Long, Message, Value};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet, MethodDescriptorProto, ServiceDescriptorProto,
};

pub const PACKAGE: &str = "test";
pub const SERVICE: &str = "test.Service";

pub fn field(name: &str, ty: Type, type_name: Option<&str>) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_owned()),
        r#type: Some(ty as i32),
        type_name: type_name.map(str::to_owned),
        label: Some(Label::Optional as i32),
        ..Default::default()
    }
}

pub fn enum_field(name: &str, enum_name: &str) -> FieldDescriptorProto {
    field(name, Type::Enum, Some(&format!(".test.{enum_name}")))
}

pub fn message_field(name: &str, type_name: &str) -> FieldDescriptorProto {
    field(name, Type::Message, Some(type_name))
}

pub fn repeated(mut field: FieldDescriptorProto) -> FieldDescriptorProto {
    field.label = Some(Label::Repeated as i32);
    field
}

pub fn msg(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_owned()),
        field: fields,
        ..Default::default()
    }
}

pub fn nested(mut outer: DescriptorProto, inner: Vec<DescriptorProto>) -> DescriptorProto {
    outer.nested_type = inner;
    outer
}

fn enumeration(name: &str, values: &[&str]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.to_owned()),
        value: values
            .iter()
            .zip(0..)
            .map(|(value, number)| EnumValueDescriptorProto {
                name: Some(value.to_string()),
                number: Some(number),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

fn method(name: &str, input: &str, output: &str) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.to_owned()),
        input_type: Some(format!(".test.{input}")),
        output_type: Some(format!(".test.{output}")),
        ..Default::default()
    }
}

pub fn messages() -> Vec<DescriptorProto> {
    vec![
        nested(
            msg(
                "ServiceMessage",
                vec![
                    message_field("a", "A"),
                    message_field("b", "B"),
                    message_field("b1", "B.B1"),
                    message_field("b11", "B.B1.B11"),
                    message_field("c", "C"),
                    message_field("d", "D"),
                    enum_field("ea", "EnumA"),
                    enum_field("eb1", "EnumB1"),
                    enum_field("eb11", "EnumB11"),
                    enum_field("ed", "EnumD"),
                ],
            ),
            vec![msg("D", vec![enum_field("d", "EnumD")])],
        ),
        msg("A", vec![enum_field("a", "EnumA")]),
        nested(
            msg("B", vec![message_field("b1", "B1")]),
            vec![nested(
                msg("B1", vec![enum_field("b1", "EnumB1")]),
                vec![msg(
                    "B11",
                    vec![enum_field("b1", "EnumB1"), enum_field("b11", "EnumB11")],
                )],
            )],
        ),
        msg(
            "C",
            vec![
                message_field("b", "B"),
                message_field("b1", "B.B1"),
                message_field("b11", "B.B1.B11"),
                enum_field("eb1", "EnumB1"),
            ],
        ),
        msg("D", vec![field("unrelated", Type::Uint64, None)]),
        msg(
            "BigInts",
            vec![field("ui", Type::Uint64, None), field("i", Type::Int64, None)],
        ),
        nested(
            msg(
                "Repeated",
                vec![
                    repeated(enum_field("enum", "AnEnum")),
                    repeated(message_field("nested", "Nested")),
                ],
            ),
            vec![msg("Nested", vec![repeated(enum_field("enum", "AnEnum"))])],
        ),
        msg(
            "Event",
            vec![
                field("name", Type::String, None),
                message_field("at", ".google.protobuf.Timestamp"),
                field("sequence", Type::Int64, None),
            ],
        ),
    ]
}

pub fn file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("test.proto".to_owned()),
        package: Some(PACKAGE.to_owned()),
        syntax: Some("proto3".to_owned()),
        message_type: messages(),
        enum_type: vec![
            enumeration("EnumA", &["ENUM_A_UNSPECIFIED", "ENUM_A_VALUE_1", "ENUM_A_VALUE_2"]),
            enumeration("EnumB1", &["ENUM_B1_UNSPECIFIED", "ENUM_B1_VALUE"]),
            enumeration("EnumB11", &["ENUM_B11_UNSPECIFIED", "ENUM_B11_VALUE"]),
            enumeration("EnumD", &["ENUM_D_UNSPECIFIED", "ENUM_D_VALUE"]),
            enumeration("AnEnum", &["AN_ENUM_UNSPECIFIED", "AN_ENUM_GOOD", "AN_ENUM_BAD"]),
        ],
        service: vec![ServiceDescriptorProto {
            name: Some("Service".to_owned()),
            method: vec![
                method("Method", "ServiceMessage", "ServiceMessage"),
                method("TestEnums", "ServiceMessage", "ServiceMessage"),
                method("TestBigInts", "BigInts", "BigInts"),
                method("TestRepeated", "Repeated", "Repeated"),
                method("TestTimestamps", "Event", "Event"),
            ],
            ..Default::default()
        }],
        ..Default::default()
    }
}

pub fn descriptor_set() -> FileDescriptorSet {
    FileDescriptorSet { file: vec![file()] }
}

pub fn service(set: &FileDescriptorSet) -> ServiceDefinition {
    ServiceDefinition::from_file_descriptor_set(set, SERVICE).expect("fixture service")
}

/// Wire payload of a fully populated `ServiceMessage`.
pub fn wire_service_message() -> Message {
    message([
        ("a", Value::from(message([("a", Value::from("ENUM_A_VALUE_1"))]))),
        (
            "b",
            Value::from(message([(
                "b1",
                Value::from(message([("b1", Value::from("ENUM_B1_VALUE"))])),
            )])),
        ),
        ("d", Value::from(message([("d", Value::from("ENUM_D_VALUE"))]))),
        ("ea", Value::from("ENUM_A_VALUE_2")),
        ("eb1", Value::from("ENUM_B1_VALUE")),
        ("ed", Value::from("ENUM_D_VALUE")),
    ])
}

pub fn wire_big_ints(ui: u64, i: i64) -> Message {
    message([
        ("ui", Value::from(Long::from_u64(ui))),
        ("i", Value::from(Long::from_i64(i))),
    ])
}
