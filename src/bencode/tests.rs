use std::collections::{BTreeMap, HashMap};
use std::io::{BufReader, Cursor};

use bytes::Bytes;
use serde::Serialize;

use super::*;

fn dict(entries: &[(&str, Value)]) -> Value {
    Value::Dict(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    )
}

#[test]
fn test_decode_integer() {
    assert_eq!(decode(b"i42e").unwrap(), Value::Integer(42));
    assert_eq!(decode(b"i-123e").unwrap(), Value::Integer(-123));
    assert_eq!(decode(b"i0e").unwrap(), Value::Integer(0));
    assert_eq!(
        decode(b"i9007199254740991e").unwrap(),
        Value::Integer(9007199254740991)
    );
    assert_eq!(
        decode(b"i-9007199254740991e").unwrap(),
        Value::Integer(-9007199254740991)
    );
    assert_eq!(
        decode(b"i-9223372036854775808e").unwrap(),
        Value::Integer(i64::MIN)
    );
}

#[test]
fn test_decode_integer_invalid() {
    for input in [
        &b"i-0e"[..],
        b"i03e",
        b"ie",
        b"i-e",
        b"i+3e",
        b"i1.5e",
        b"i 1e",
        b"i9223372036854775808e",
    ] {
        assert!(
            matches!(decode(input), Err(BencodeError::InvalidInteger(_))),
            "{:?}",
            String::from_utf8_lossy(input)
        );
    }
}

#[test]
fn test_decode_integer_unterminated() {
    assert!(matches!(
        decode(b"i42"),
        Err(BencodeError::UnexpectedEof(Construct::Integer))
    ));
    assert!(decode(b"i42").unwrap_err().is_eof());
    assert!(!decode(b"i4x2e").unwrap_err().is_eof());
}

#[test]
fn test_decode_integer_literal_too_long() {
    let mut input = b"i".to_vec();
    input.extend(std::iter::repeat(b'1').take(64));
    assert!(matches!(
        decode(&input),
        Err(BencodeError::InvalidInteger(_))
    ));
}

#[test]
fn test_decode_text() {
    assert_eq!(decode(b"5:hello").unwrap(), Value::text("hello"));
    assert_eq!(decode(b"0:").unwrap(), Value::text(""));
    assert_eq!(
        decode("6:中文".as_bytes()).unwrap(),
        Value::text("中文")
    );
}

#[test]
fn test_decode_raw() {
    let value = decode(b"4:\xff\xfeAB").unwrap();
    assert_eq!(
        value,
        Value::raw(Bytes::from_static(&[0xff, 0xfe, 0x41, 0x42]))
    );
    assert_eq!(value.as_str(), None);
    assert_eq!(value.as_bytes(), Some(&[0xff, 0xfe, 0x41, 0x42][..]));
}

#[test]
fn test_decode_raw_strings_option() {
    let options = DecodeOptions::new().raw_strings();
    let value = decode_with(b"l5:hellod1:a3:fooee", &options).unwrap();
    let list = value.as_list().unwrap();
    assert_eq!(list[0], Value::raw(Bytes::from_static(b"hello")));
    // Keys stay text; values do not.
    assert_eq!(
        list[1].get("a"),
        Some(&Value::raw(Bytes::from_static(b"foo")))
    );
}

#[test]
fn test_decode_string_too_short() {
    assert!(matches!(
        decode(b"10:hello"),
        Err(BencodeError::UnexpectedEof(Construct::ByteString))
    ));
}

#[test]
fn test_decode_string_length_invalid() {
    for input in [&b"05:hello"[..], b"-1:a", b"+1:a", b"x:", b":"] {
        assert!(
            matches!(decode(input), Err(BencodeError::InvalidStringLength(_))),
            "{:?}",
            String::from_utf8_lossy(input)
        );
    }
    assert!(matches!(
        decode(b"12"),
        Err(BencodeError::UnexpectedEof(Construct::ByteStringLength))
    ));
}

#[test]
fn test_decode_list() {
    assert_eq!(
        decode(b"li1ei2ei3ee").unwrap(),
        Value::List(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
    );
    assert_eq!(decode(b"le").unwrap(), Value::List(vec![]));
    assert_eq!(
        decode(b"l0:e").unwrap(),
        Value::List(vec![Value::text("")])
    );
}

#[test]
fn test_decode_nested() {
    let value = decode(b"li1e5:helloli1ei2ei3eed1:ai1e1:bi2eee").unwrap();
    assert_eq!(
        value,
        Value::List(vec![
            Value::Integer(1),
            Value::text("hello"),
            Value::List(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]),
            dict(&[("a", Value::Integer(1)), ("b", Value::Integer(2))]),
        ])
    );
}

#[test]
fn test_decode_dict() {
    let expected = dict(&[("a", Value::Integer(1)), ("b", Value::Integer(2))]);
    assert_eq!(decode(b"d1:ai1e1:bi2ee").unwrap(), expected);
    assert_eq!(decode(b"d1:bi2e1:ai1ee").unwrap(), expected);
    assert_eq!(decode(b"de").unwrap(), Value::Dict(BTreeMap::new()));
}

#[test]
fn test_decode_dict_duplicate_key_overwrites() {
    let value = decode(b"d1:ai1e1:ai2ee").unwrap();
    assert_eq!(value, dict(&[("a", Value::Integer(2))]));
}

#[test]
fn test_decode_dict_non_string_key() {
    assert!(decode(b"di1ei2ee").is_err());
}

#[test]
fn test_decode_dict_raw_key() {
    let value = decode(b"d2:\xff\x01i7ee").unwrap();
    let d = value.as_dict().unwrap();
    let key = d.keys().next().unwrap();

    assert_eq!(key, "RawBytes[255,1]");
    assert!(is_raw_key(key));
    assert_eq!(parse_raw_key(key).unwrap(), Bytes::from_static(&[0xff, 0x01]));
    assert_eq!(value.get_bytes(&[0xff, 0x01]), Some(&Value::Integer(7)));
}

#[test]
fn test_decode_unterminated_containers() {
    assert!(matches!(
        decode(b"li1e"),
        Err(BencodeError::UnexpectedEof(Construct::List))
    ));
    assert!(matches!(
        decode(b"d1:ai1e"),
        Err(BencodeError::UnexpectedEof(Construct::Dict))
    ));
    assert!(matches!(
        decode(b"d1:a"),
        Err(BencodeError::UnexpectedEof(Construct::Dict))
    ));
}

#[test]
fn test_decode_lenient_eof() {
    let options = DecodeOptions::new().lenient_eof();
    assert_eq!(
        decode_with(b"li1eli2e", &options).unwrap(),
        Value::List(vec![
            Value::Integer(1),
            Value::List(vec![Value::Integer(2)])
        ])
    );
    assert_eq!(
        decode_with(b"d1:ai1e", &options).unwrap(),
        dict(&[("a", Value::Integer(1))])
    );
    // A pending fixed-length read still fails.
    assert!(decode_with(b"l5:hel", &options).is_err());
}

#[test]
fn test_decode_empty_input() {
    assert!(matches!(
        decode(b""),
        Err(BencodeError::UnexpectedEof(Construct::Value))
    ));
}

#[test]
fn test_trailing_data_error() {
    assert!(matches!(
        decode(b"i42eextra"),
        Err(BencodeError::TrailingData)
    ));
    let options = DecodeOptions::new().allow_trailing();
    assert_eq!(decode_with(b"i42eextra", &options).unwrap(), Value::Integer(42));
}

#[test]
fn test_nesting_limit() {
    let deep = |n: usize| {
        let mut data = vec![b'l'; n];
        data.extend(std::iter::repeat(b'e').take(n));
        data
    };

    assert!(decode(&deep(crate::constants::MAX_DEPTH)).is_ok());
    assert!(matches!(
        decode(&deep(crate::constants::MAX_DEPTH + 1)),
        Err(BencodeError::NestingTooDeep)
    ));

    let options = DecodeOptions::new().max_depth(1);
    assert!(decode_with(b"li1ee", &options).is_ok());
    assert!(decode_with(b"llee", &options).is_err());
}

#[test]
fn test_decoder_multiple_values() {
    let mut decoder = Decoder::new(SliceSource::from_slice(b"i1e3:twoli3ee"));
    assert_eq!(decoder.decode_next().unwrap(), Some(Value::Integer(1)));
    assert_eq!(decoder.position(), 3);
    assert_eq!(decoder.decode_next().unwrap(), Some(Value::text("two")));
    assert_eq!(
        decoder.decode_next().unwrap(),
        Some(Value::List(vec![Value::Integer(3)]))
    );
    assert_eq!(decoder.decode_next().unwrap(), None);
}

#[test]
fn test_decode_bytes_zero_copy() {
    let data = Bytes::from_static(b"l3:\xff\xfe\xfde");
    let value = decode_bytes(data.clone()).unwrap();
    let raw = match &value.as_list().unwrap()[0] {
        Value::ByteString(ByteString::Raw(b)) => b.clone(),
        other => panic!("expected raw bytes, got {other:?}"),
    };
    assert_eq!(raw.as_ptr(), data[3..].as_ptr());
}

#[test]
fn test_decode_reader() {
    // A tiny buffer forces values to straddle refills.
    let mut reader = BufReader::with_capacity(2, Cursor::new(b"d4:spaml1:a1:bee3:end".to_vec()));
    let options = DecodeOptions::default();

    let first = decode_reader(&mut reader, &options).unwrap().unwrap();
    assert_eq!(
        first,
        dict(&[(
            "spam",
            Value::List(vec![Value::text("a"), Value::text("b")])
        )])
    );
    let second = decode_reader(&mut reader, &options).unwrap().unwrap();
    assert_eq!(second, Value::text("end"));
    assert!(decode_reader(&mut reader, &options).unwrap().is_none());
}

#[test]
fn test_decode_reader_short_string() {
    let reader = Cursor::new(b"100:abc".to_vec());
    assert!(matches!(
        decode_reader(reader, &DecodeOptions::default()),
        Err(BencodeError::UnexpectedEof(Construct::ByteString))
    ));
}

#[test]
fn test_encode_integer() {
    assert_eq!(encode(&Value::Integer(42)), b"i42e");
    assert_eq!(encode(&Value::Integer(-123)), b"i-123e");
    assert_eq!(encode(&Value::Integer(0)), b"i0e");
    assert_eq!(
        encode(&Value::Integer(9007199254740991)),
        b"i9007199254740991e"
    );
}

#[test]
fn test_encode_byte_strings() {
    assert_eq!(encode(&Value::text("hello")), b"5:hello");
    assert_eq!(encode(&Value::text("")), b"0:");
    assert_eq!(encode(&Value::text("中文")), "6:中文".as_bytes());
    assert_eq!(
        encode(&Value::raw(vec![0x68u8, 0x65, 0x6c, 0x6c, 0x6f])),
        b"5:hello"
    );
}

#[test]
fn test_encode_list() {
    assert_eq!(
        encode(&Value::List(vec![
            Value::Integer(1),
            Value::text("hello"),
            Value::List(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]),
            dict(&[("a", Value::Integer(1)), ("b", Value::Integer(2))]),
        ])),
        b"li1e5:helloli1ei2ei3eed1:ai1e1:bi2eee"
    );
    assert_eq!(encode(&Value::List(vec![])), b"le");
    assert_eq!(encode(&Value::List(vec![Value::text("")])), b"l0:e");
}

#[test]
fn test_encode_dict() {
    assert_eq!(
        encode(&dict(&[("b", Value::Integer(2)), ("a", Value::Integer(1))])),
        b"d1:ai1e1:bi2ee"
    );
    assert_eq!(encode(&Value::Dict(BTreeMap::new())), b"de");
}

#[test]
fn test_encode_dict_sorts_raw_keys_by_bytes() {
    // As strings "RawBytes[255]" sorts before "z"; as bytes 0xff sorts after.
    let key = raw_key(&[0xff]);
    let value = dict(&[("z", Value::Integer(1)), (key.as_str(), Value::Integer(2))]);
    assert_eq!(encode(&value), b"d1:zi1e1:\xffi2ee");
}

#[test]
fn test_encode_binary_pieces() {
    let pieces: Vec<u8> = vec![
        170, 244, 198, 29, 220, 197, 232, 162, 218, 190, 222, 15, 59, 72, 44, 217, 174, 169, 67,
        77,
    ];
    let value = dict(&[("pieces", Value::raw(pieces.clone()))]);

    let mut expected = b"d6:pieces20:".to_vec();
    expected.extend_from_slice(&pieces);
    expected.push(b'e');
    assert_eq!(encode(&value), expected);
}

#[test]
fn test_encode_to_writer() {
    let mut out = Vec::new();
    encode_to(&Value::List(vec![Value::Integer(7)]), &mut out).unwrap();
    assert_eq!(out, b"li7ee");
}

#[test]
fn test_roundtrip() {
    // Keys must be sorted lexicographically for bencode roundtrip
    let original = b"d8:announce15:http://test.com4:infod4:name4:test12:piece lengthi16384eee";
    let decoded = decode(original).unwrap();
    let encoded = encode(&decoded);
    assert_eq!(encoded, original);
}

#[test]
fn test_roundtrip_raw_values_and_keys() {
    let original = b"d1:al3:\xff\x00\x012:\xc3\x28i-5ee2:\xfe\xfei1ee";
    let decoded = decode(original).unwrap();
    assert_eq!(encode(&decoded), original);
}

#[test]
fn test_text_classification_is_stable() {
    let value = Value::text("κόσμε");
    let decoded = decode(&encode(&value)).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(encode(&decoded), encode(&value));
}

#[test]
fn test_is_valid_text() {
    assert!(is_valid_text(&[0xe4, 0xb8, 0xad, 0xe6, 0x96, 0x87]));
    assert!(!is_valid_text(&[0x80, 0x80, 0x80, 0x80]));
    assert!(is_valid_text(b"Hello"));
    assert!(!is_valid_text(&[0xff, 0xfe, 0x41, 0x42]));
    assert!(is_valid_text("你好，世界！".as_bytes()));
    assert!(is_valid_text(b"\x00"));
    assert!(is_valid_text(b""));
    assert!(!is_valid_text(&[0x80]));
    // Overlong encoding of '/'.
    assert!(!is_valid_text(&[0xc0, 0xaf]));
    // Truncated three-byte sequence.
    assert!(!is_valid_text(&[0xe4, 0xb8]));
    // CESU-8 style surrogate in the middle of otherwise valid text.
    assert!(!is_valid_text(&[
        0xce, 0xba, 0xe1, 0xbd, 0xb9, 0xcf, 0x83, 0xce, 0xbc, 0xce, 0xb5, 0xed, 0xa0, 0x80, 0x65,
        0x64, 0x69, 0x74, 0x65, 0x64,
    ]));
}

#[test]
fn test_raw_key_literal() {
    assert_eq!(raw_key(&[0, 128, 255]), "RawBytes[0,128,255]");
    assert_eq!(
        parse_raw_key("RawBytes[0,128,255]").unwrap(),
        Bytes::from_static(&[0, 128, 255])
    );

    for not_raw in [
        "RawBytes[]",
        "RawBytes[256]",
        "RawBytes[01,128]",
        "RawBytes[1, 128]",
        "RawBytes[-1]",
        "RawBytes[104,105]",
        "RawBytes[128",
        "rawbytes[128]",
        "hello",
    ] {
        assert!(parse_raw_key(not_raw).is_none(), "{not_raw}");
    }

    // A text key that looks like a literal of valid UTF-8 stays text.
    assert_eq!(&*key_to_bytes("RawBytes[104,105]"), b"RawBytes[104,105]");
    assert_eq!(&*key_to_bytes("RawBytes[255]"), &[0xffu8]);
    assert_eq!(key_from_bytes(b"plain"), "plain");
}

#[test]
fn test_value_accessors() {
    let value = Value::Integer(42);
    assert_eq!(value.as_integer(), Some(42));
    assert!(value.as_bytes().is_none());
    assert_eq!(value.kind(), "integer");

    let value = Value::text("test");
    assert_eq!(value.as_str(), Some("test"));
    assert!(value.as_integer().is_none());
    assert_eq!(value.as_byte_string().map(ByteString::len), Some(4));

    let value = Value::List(vec![]);
    assert!(value.as_list().is_some());
    assert!(value.as_dict().is_none());

    let value = dict(&[("k", Value::Integer(1))]);
    assert_eq!(value.get("k"), Some(&Value::Integer(1)));
    assert_eq!(value.into_dict().map(|d| d.len()), Some(1));
}

#[test]
fn test_byte_string_classify() {
    assert_eq!(
        ByteString::classify(Bytes::from_static(b"spam")),
        ByteString::Text("spam".into())
    );
    assert_eq!(
        ByteString::classify(Bytes::from_static(&[0xc3, 0x28])),
        ByteString::Raw(Bytes::from_static(&[0xc3, 0x28]))
    );
    assert_eq!(
        ByteString::Raw(Bytes::from_static(&[0xff])).into_key(),
        "RawBytes[255]"
    );
    assert_eq!(ByteString::from("x").into_bytes(), Bytes::from_static(b"x"));
}

#[derive(Serialize)]
struct Info {
    name: String,
    #[serde(rename = "piece length")]
    piece_length: u32,
    #[serde(with = "serde_bytes_compat")]
    pieces: Vec<u8>,
    files: Vec<FileEntry>,
}

#[derive(Serialize)]
struct FileEntry {
    length: u64,
    path: Vec<String>,
}

mod serde_bytes_compat {
    pub fn serialize<S: serde::Serializer>(
        bytes: &[u8],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(bytes)
    }
}

#[derive(Serialize)]
enum Event {
    Started,
    Progress(u8),
    Moved { from: String },
}

#[test]
fn test_to_bytes_struct() {
    let info = Info {
        name: "a".into(),
        piece_length: 16384,
        pieces: vec![0xff, 0x00],
        files: vec![FileEntry {
            length: 3,
            path: vec!["dir".into(), "f".into()],
        }],
    };
    assert_eq!(
        to_bytes(&info).unwrap(),
        b"d5:filesld6:lengthi3e4:pathl3:dir1:feee4:name1:a12:piece lengthi16384e6:pieces2:\xff\x00e"
    );
}

#[test]
fn test_to_value_enums() {
    assert_eq!(to_value(&Event::Started).unwrap(), Value::text("Started"));
    assert_eq!(
        to_value(&Event::Progress(5)).unwrap(),
        dict(&[("Progress", Value::Integer(5))])
    );
    assert_eq!(
        to_value(&Event::Moved { from: "x".into() }).unwrap(),
        dict(&[("Moved", dict(&[("from", Value::text("x"))]))])
    );
}

#[test]
fn test_to_value_numbers() {
    assert_eq!(to_value(&-7i8).unwrap(), Value::Integer(-7));
    assert_eq!(to_value(&2.0f32).unwrap(), Value::Integer(2));
    assert_eq!(
        to_value(&9007199254740991.0f64).unwrap(),
        Value::Integer(9007199254740991)
    );

    for bad in [1.23f64, f64::NAN, f64::INFINITY, 1e300] {
        assert!(
            matches!(to_value(&bad), Err(BencodeError::InvalidInput(_))),
            "{bad}"
        );
    }
    assert!(matches!(
        to_value(&u64::MAX),
        Err(BencodeError::InvalidInput(_))
    ));
}

#[test]
fn test_to_value_unsupported() {
    assert!(matches!(
        to_value(&true),
        Err(BencodeError::UnsupportedValue(ref kind)) if kind == "boolean"
    ));
    assert!(matches!(
        to_value(&None::<i64>),
        Err(BencodeError::UnsupportedValue(ref kind)) if kind == "null"
    ));
    assert!(matches!(
        to_value(&()),
        Err(BencodeError::UnsupportedValue(_))
    ));
    assert!(matches!(
        to_value(&vec![Some(1), None]),
        Err(BencodeError::UnsupportedValue(_))
    ));

    let mut map = HashMap::new();
    map.insert(1, "one");
    assert!(matches!(
        to_value(&map),
        Err(BencodeError::UnsupportedValue(ref kind)) if kind == "integer as dictionary key"
    ));
}

#[test]
fn test_to_value_of_value_is_identity() {
    let value = decode(b"d1:a3:\xff\x00\x012:\xfe\xfeli1e0:ee").unwrap();
    assert_eq!(to_value(&value).unwrap(), value);
}

#[tokio::test]
async fn test_stream_reads_successive_values() {
    let (mut client, server) = tokio::io::duplex(4);
    let writer = tokio::spawn(async move {
        write_value(&mut client, &Value::Integer(1)).await.unwrap();
        write_value(&mut client, &dict(&[("k", Value::text("value"))]))
            .await
            .unwrap();
    });

    let mut stream = BencodeStream::new(server);
    assert_eq!(stream.read_value().await.unwrap(), Some(Value::Integer(1)));
    assert_eq!(
        stream.read_value().await.unwrap(),
        Some(dict(&[("k", Value::text("value"))]))
    );
    writer.await.unwrap();
    assert_eq!(stream.read_value().await.unwrap(), None);
}

#[tokio::test]
async fn test_stream_eof_inside_value() {
    let input: &[u8] = b"l4:spam";
    let mut stream = BencodeStream::new(input);
    assert!(matches!(
        stream.read_value().await,
        Err(BencodeError::UnexpectedEof(Construct::List))
    ));
}

#[tokio::test]
async fn test_stream_malformed_input() {
    let input: &[u8] = b"i01e";
    let mut stream = BencodeStream::new(input);
    assert!(matches!(
        stream.read_value().await,
        Err(BencodeError::InvalidInteger(_))
    ));
}

#[tokio::test]
async fn test_stream_value_too_large() {
    let input: &[u8] = b"1000:abcdefgh";
    let mut stream = BencodeStream::new(input).max_value_size(8);
    assert!(matches!(
        stream.read_value().await,
        Err(BencodeError::ValueTooLarge(_))
    ));
}

#[tokio::test]
async fn test_stream_from_file() {
    use tokio::io::AsyncWriteExt;

    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("example.torrent");

    let mut pieces = Vec::new();
    for i in 0..40u8 {
        pieces.push(i.wrapping_mul(37) | 0x80);
    }
    let mut info = BTreeMap::new();
    info.insert("name".to_string(), Value::text("example.iso"));
    info.insert("piece length".to_string(), Value::Integer(262144));
    info.insert("pieces".to_string(), Value::raw(pieces.clone()));
    let torrent = dict(&[
        ("announce", Value::text("https://tracker.example.com/announce")),
        ("info", Value::Dict(info)),
    ]);

    let mut file = tokio::fs::File::create(&path).await.unwrap();
    write_value(&mut file, &torrent).await.unwrap();
    file.flush().await.unwrap();
    drop(file);

    let file = tokio::fs::File::open(&path).await.unwrap();
    let mut stream = BencodeStream::new(file);
    let decoded = stream.read_value().await.unwrap().unwrap();

    assert_eq!(
        decoded.get("announce").and_then(Value::as_str),
        Some("https://tracker.example.com/announce")
    );
    let info = decoded.get("info").unwrap();
    assert_eq!(
        info.get("piece length").and_then(Value::as_integer),
        Some(262144)
    );
    assert_eq!(
        info.get("pieces").and_then(Value::as_bytes).map(<[u8]>::len),
        Some(40)
    );
    assert_eq!(decoded, torrent);
}
