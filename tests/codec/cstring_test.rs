/*!
 * C-String Codec Tests
 */

use memref::{Encoding, Runtime};
use pretty_assertions::assert_eq;

#[test]
fn test_encodings_round_trip_through_memory() {
    let rt = Runtime::simulated().unwrap();
    for encoding in [Encoding::Utf8, Encoding::Utf16Le, Encoding::Latin1, Encoding::Ascii] {
        let buf = rt.alloc_cstring("plain text", encoding).unwrap();
        assert_eq!(
            buf.read_cstring(0, encoding).unwrap(),
            "plain text",
            "encoding {}",
            encoding
        );
        assert_eq!(buf.len(), encoding.encoded_len("plain text") + encoding.unit_width());
    }
}

#[test]
fn test_latin1_keeps_high_bytes() {
    let rt = Runtime::simulated().unwrap();
    let buf = rt.alloc_cstring("d\u{e9}j\u{e0}", Encoding::Latin1).unwrap();
    assert_eq!(buf.to_bytes().unwrap(), vec![b'd', 0xe9, b'j', 0xe0, 0]);
    assert_eq!(buf.read_cstring(0, Encoding::Latin1).unwrap(), "d\u{e9}j\u{e0}");
}

#[test]
fn test_write_truncates_to_whole_characters() {
    let rt = Runtime::simulated().unwrap();
    let buf = rt.from_bytes(&[0xffu8; 4]).unwrap();
    // 'é' is two bytes and would leave no room for the terminator
    buf.write_cstring(0, "ab\u{e9}", Encoding::Utf8).unwrap();
    assert_eq!(buf.to_bytes().unwrap(), vec![b'a', b'b', 0, 0xff]);

    let wide = rt.from_bytes(&[0xffu8; 5]).unwrap();
    wide.write_cstring(0, "abc", Encoding::Utf16Le).unwrap();
    assert_eq!(wide.to_bytes().unwrap(), vec![b'a', 0, 0, 0, 0xff]);
}

#[test]
fn test_write_at_offset() {
    let rt = Runtime::simulated().unwrap();
    let buf = rt.from_bytes(&[b'-'; 8]).unwrap();
    buf.write_cstring(2, "hi", Encoding::Utf8).unwrap();
    assert_eq!(buf.to_bytes().unwrap(), b"--hi\0---".to_vec());
    assert_eq!(buf.read_cstring(2, Encoding::Utf8).unwrap(), "hi");
}

#[test]
fn test_alloc_cstring_copies_from_view() {
    let rt = Runtime::simulated().unwrap();
    let original = rt.from_bytes(b"copy me\0").unwrap();
    let copy = rt.alloc_cstring(original.clone(), Encoding::Utf8).unwrap();
    assert_ne!(copy.address(), original.address());
    assert_eq!(copy.read_cstring(0, Encoding::Utf8).unwrap(), "copy me");
}

#[test]
fn test_encoding_parse() {
    assert_eq!("utf8".parse::<Encoding>().unwrap(), Encoding::Utf8);
    assert_eq!("ucs-2".parse::<Encoding>().unwrap(), Encoding::Utf16Le);
    assert_eq!("latin1".parse::<Encoding>().unwrap(), Encoding::Latin1);
    assert!("klingon".parse::<Encoding>().is_err());
}
