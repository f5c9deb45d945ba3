//! End-to-end tests over real files:
//! whole-file round trips, sequential construction,
//! in-place append, and structure dumping.

use bintag_core::value::Array;
use bintag_object::{
    append_file, create_file, dump_file, open_file, read_file, write_file, AppendError, ByteOrder,
    CreateFileOptions, DumpOptions, OpenFileOptions, Value,
};

fn sample_value() -> Value {
    Value::dict(vec![
        ("null", Value::Null),
        ("flag", Value::Bool(true)),
        ("small", Value::int(42)),
        ("wide", Value::I64(-(1 << 40))),
        ("unsigned", Value::uint(70_000)),
        ("pi", Value::F64(3.141592653589793)),
        ("name", Value::Str("observation".into())),
        ("raw", Value::Bytes(vec![0xDE, 0xAD, 0xBE, 0xEF])),
        (
            "rows",
            Value::list(vec![
                Value::list(vec![Value::int(1), Value::int(2)]),
                Value::Str("".into()),
                Value::Bytes(vec![]),
                Value::list(vec![]),
                Value::dict(Vec::<(&str, Value)>::new()),
            ]),
        ),
        (
            "grid",
            Value::Array(Array::from_elements(vec![2, 3], &[1.5_f32, 2.5, 3.5, 4.5, 5.5, 6.5]).unwrap()),
        ),
    ])
}

#[test]
fn whole_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.btg");
    let value = sample_value();
    write_file(&path, &value).unwrap();
    assert_eq!(read_file(&path).unwrap(), value);
}

#[test]
fn round_trip_in_both_byte_orders() {
    let dir = tempfile::tempdir().unwrap();
    let value = sample_value();
    for &byte_order in &[ByteOrder::Little, ByteOrder::Big] {
        let path = dir.path().join("ordered.btg");
        let mut writer = CreateFileOptions::new()
            .byte_order(byte_order)
            .create(&path)
            .unwrap();
        writer.write_value(&value).unwrap();
        writer.finish().unwrap();

        let mut nav = OpenFileOptions::new()
            .byte_order(byte_order)
            .open(&path)
            .unwrap();
        assert_eq!(nav.read().unwrap(), value);
    }
}

#[test]
fn sequential_build_and_navigate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sequential.btg");

    let mut writer = create_file(&path).unwrap();
    let root = writer.open_list().unwrap();
    writer.open_list().unwrap();
    writer.write_value(&Value::int(1)).unwrap();
    writer.write_value(&Value::int(4)).unwrap();
    writer.open_dict().unwrap();
    writer.key("five").unwrap();
    writer.write_value(&Value::int(5)).unwrap();
    writer.key("six").unwrap();
    writer.write_value(&Value::int(6)).unwrap();
    writer.select(root).unwrap();
    writer.write_value(&Value::int(7)).unwrap();
    writer.finish().unwrap();

    let expected = Value::list(vec![
        Value::list(vec![
            Value::int(1),
            Value::int(4),
            Value::dict(vec![("five", Value::int(5)), ("six", Value::int(6))]),
        ]),
        Value::int(7),
    ]);
    assert_eq!(read_file(&path).unwrap(), expected);

    let mut nav = open_file(&path).unwrap();
    assert_eq!(
        nav.fetch(&[0.into(), 2.into(), "five".into()]).unwrap(),
        Value::I8(5)
    );
}

#[test]
fn append_extends_the_root_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("append.btg");

    write_file(&path, &Value::list(vec![Value::int(1), Value::int(2)])).unwrap();

    let mut writer = append_file(&path).unwrap();
    writer.write_value(&Value::Str("extra".into())).unwrap();
    writer.finish().unwrap();

    assert_eq!(
        read_file(&path).unwrap(),
        Value::list(vec![
            Value::int(1),
            Value::int(2),
            Value::Str("extra".into())
        ])
    );
}

#[test]
fn append_extends_the_root_dict() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("append_dict.btg");

    write_file(&path, &Value::dict(vec![("a", Value::int(1))])).unwrap();

    let mut writer = append_file(&path).unwrap();
    writer.key("b").unwrap();
    writer.write_value(&Value::int(2)).unwrap();
    writer.finish().unwrap();

    assert_eq!(
        read_file(&path).unwrap(),
        Value::dict(vec![("a", Value::int(1)), ("b", Value::int(2))])
    );
}

#[test]
fn append_rejects_scalar_roots() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scalar.btg");
    write_file(&path, &Value::int(7)).unwrap();
    assert!(matches!(
        append_file(&path),
        Err(AppendError::RootNotExtensible { .. })
    ));
}

#[test]
fn append_rejects_missing_trailer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.btg");
    // a list whose terminator was lost
    std::fs::write(&path, b"[n").unwrap();
    assert!(matches!(
        append_file(&path),
        Err(AppendError::MalformedTrailer { .. })
    ));
}

#[test]
fn repeated_appends_stay_neutral() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repeat.btg");
    write_file(&path, &Value::list(vec![])).unwrap();

    for i in 0..4 {
        let mut writer = append_file(&path).unwrap();
        writer.write_value(&Value::int(i)).unwrap();
        writer.finish().unwrap();
    }
    assert_eq!(
        read_file(&path).unwrap(),
        Value::list(vec![
            Value::int(0),
            Value::int(1),
            Value::int(2),
            Value::int(3)
        ])
    );
}

#[test]
fn dump_walks_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.btg");
    write_file(&path, &sample_value()).unwrap();

    let lines: Vec<String> = dump_file(&path, ByteOrder::Auto, DumpOptions::new())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert!(lines.len() > 10);
    assert_eq!(lines[0], "{");
    assert_eq!(lines.last().unwrap(), "}");
    assert!(lines.iter().any(|line| line.contains("\"grid\":")));
}
