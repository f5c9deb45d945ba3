#![no_main]
use libfuzzer_sys::fuzz_target;
use std::error::Error;

fuzz_target!(|data: &[u8]| {
    let _ = fuzz(data);
});

fn fuzz(data: &[u8]) -> Result<(), Box<dyn Error>> {
    // deserialize random bytes
    let value = bintag_object::from_bytes(data, bintag_object::ByteOrder::Little)?;

    // serialize the value back to bytes
    let bytes = bintag_object::to_bytes(&value, bintag_object::ByteOrder::Little)
        .expect("materialized values should always serialize");

    // deserialize back to a value
    let value2 = bintag_object::from_bytes(&bytes, bintag_object::ByteOrder::Little)
        .expect("serialized values should always deserialize");

    // assert equivalence
    assert_eq!(value, value2);

    Ok(())
}
