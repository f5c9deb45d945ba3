//! Tests for the public value and selection API.

use bintag_core::selector::{apply, CellSelector, SelectError, Selector, SliceArg};
use bintag_core::value::Array;
use bintag_core::{ElementKind, Value, ValueType};

#[test]
fn value_construction_and_access() {
    let value = Value::dict(vec![
        ("label", Value::from("sensor-4")),
        ("active", Value::from(true)),
        ("offsets", Value::list(vec![Value::int(-3), Value::int(900)])),
    ]);

    assert_eq!(value.value_type(), ValueType::Dict);
    assert_eq!(
        value.get("label").and_then(Value::as_str),
        Some("sensor-4")
    );
    assert_eq!(value.get("active").and_then(Value::as_bool), Some(true));

    let offsets = value.get("offsets").unwrap();
    assert_eq!(offsets.get_index(0), Some(&Value::I8(-3)));
    assert_eq!(offsets.get_index(1), Some(&Value::I16(900)));
}

#[test]
fn numeric_casts() {
    assert_eq!(Value::I16(300).to_int::<u32>().unwrap(), 300);
    assert!(Value::I16(-1).to_int::<u32>().is_err());
    assert_eq!(Value::U8(9).to_float64().unwrap(), 9.0);
    assert!(Value::Str("9".into()).to_int::<i32>().is_err());
}

#[test]
fn array_shape_and_elements() {
    let array = Array::from_elements(vec![2, 2], &[10_i64, 20, 30, 40]).unwrap();
    assert_eq!(array.kind(), ElementKind::I64);
    assert_eq!(array.num_elements(), 4);
    assert_eq!(array.element(&[1, 0]), Some(Value::I64(30)));
    assert_eq!(array.element(&[2, 0]), None);
}

#[test]
fn selection_over_nested_values() {
    let value = Value::dict(vec![(
        "series",
        Value::list(vec![
            Value::Array(Array::from_vec(vec![1_i32, 2, 3, 4, 5])),
            Value::Array(Array::from_vec(vec![6_i32, 7])),
        ]),
    )]);

    // pick one element out of the first array
    let got = apply(
        &value,
        &["series".into(), 0.into(), Selector::Index(-1)],
    )
    .unwrap();
    assert_eq!(got, Value::I32(5));

    // slice the first array
    let got = apply(
        &value,
        &[
            "series".into(),
            0.into(),
            Selector::Slice(SliceArg::new(Some(0), None, Some(2))),
        ],
    )
    .unwrap();
    assert_eq!(got.as_array().unwrap().to_vec::<i32>(), Some(vec![1, 3, 5]));
}

#[test]
fn selection_boundaries() {
    let list = Value::list(vec![Value::int(0), Value::int(1), Value::int(2)]);

    // -len resolves to the first element
    assert_eq!(apply(&list, &[Selector::Index(-3)]).unwrap(), Value::I8(0));
    // one before that is out of range
    assert_eq!(
        apply(&list, &[Selector::Index(-4)]),
        Err(SelectError::IndexOutOfRange { index: -4, len: 3 })
    );
    // a slice entirely out of bounds is empty, not an error
    assert_eq!(
        apply(&list, &[Selector::Slice(SliceArg::range(5, 9))]).unwrap(),
        Value::List(vec![])
    );
}

#[test]
fn cells_against_rank_two() {
    let array = Array::from_elements(vec![3, 2], &[1_u8, 2, 3, 4, 5, 6]).unwrap();
    let value = Value::Array(array);

    // a column: every row, second component
    let got = apply(
        &value,
        &[Selector::Cells(vec![
            CellSelector::Slice(SliceArg::full()),
            CellSelector::Index(1),
        ])],
    )
    .unwrap();
    let column = got.as_array().unwrap();
    assert_eq!(column.shape(), &[3]);
    assert_eq!(column.to_vec::<u8>(), Some(vec![2, 4, 6]));
}
