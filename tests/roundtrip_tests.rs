// Roundtrip tests - encode blocks with Input and decode them with Results
// Property tests cover the time-of-day conversion for every precision

use bytes::BytesMut;
use chrono::{
    NaiveTime,
    Timelike,
};
use clickhouse_native_proto::{
    block,
    column::*,
    io::Reader,
    types::{
        Precision,
        Time,
        Time64,
    },
    Block,
    Input,
    ProtocolVersion,
    Results,
    TypeEncoding,
};
use proptest::prelude::*;

// ============================================================================
// Test Helper Functions
// ============================================================================

fn sample_input() -> Input {
    let mut t = ColumnTime::new();
    t.append_time(&NaiveTime::from_hms_opt(1, 2, 3).unwrap());
    t.append(None);

    let mut t64 = ColumnTime64::new().with_precision(Precision::MICRO);
    t64.append_time(&NaiveTime::from_hms_micro_opt(4, 5, 6, 7).unwrap());
    t64.append_time(&NaiveTime::from_hms_micro_opt(23, 0, 0, 1).unwrap());

    let mut n = ColumnInt64::new();
    n.append(-5);
    n.append(5);

    Input::new()
        .with_column("t", Box::new(t))
        .with_column("t64", Box::new(t64))
        .with_column("n", Box::new(n))
}

fn roundtrip(
    input: &Input,
    proto: &ProtocolVersion,
    encoding: TypeEncoding,
) -> Results {
    let mut buf = BytesMut::new();
    Block::encode(&mut buf, proto, input, encoding).unwrap();

    let mut results = Results::new();
    let mut reader = Reader::new(&buf[..]);
    Block::decode(&mut reader, proto, &mut results.auto()).unwrap();
    assert_eq!(reader.offset(), buf.len() as u64);
    results
}

fn check_sample(results: &Results) {
    assert_eq!(results.len(), 3);
    assert_eq!(results.rows(), 2);

    let t = results.column_as::<ColumnTime>("t").unwrap();
    let first = t.row(0).unwrap();
    assert_eq!((first.hour(), first.minute(), first.second()), (1, 2, 3));
    assert_eq!(t.row(1), None);

    let t64 = results.column_as::<ColumnTime64>("t64").unwrap();
    assert_eq!(t64.precision(), Some(Precision::MICRO));
    assert_eq!(t64.row(0).unwrap().nanosecond(), 7_000);
    assert_eq!(t64.row(1).unwrap().hour(), 23);

    let n = results.column_as::<ColumnInt64>("n").unwrap();
    assert_eq!(n.data(), &[-5, 5]);
}

// ============================================================================
// Block Roundtrip Tests
// ============================================================================

#[test]
fn test_roundtrip_name_encoding() {
    let results =
        roundtrip(&sample_input(), &ProtocolVersion::CURRENT, TypeEncoding::Name);
    check_sample(&results);
}

#[test]
fn test_roundtrip_binary_encoding() {
    let results =
        roundtrip(&sample_input(), &ProtocolVersion::CURRENT, TypeEncoding::Binary);
    check_sample(&results);
}

#[test]
fn test_roundtrip_legacy_revision() {
    for revision in [50_000, 51_000, 54_453] {
        let proto = ProtocolVersion::new(revision);
        let results = roundtrip(&sample_input(), &proto, TypeEncoding::Binary);
        check_sample(&results);
    }
}

#[test]
fn test_roundtrip_into_declared_schema() {
    let proto = ProtocolVersion::CURRENT;
    let mut buf = BytesMut::new();
    Block::encode(&mut buf, &proto, &sample_input(), TypeEncoding::Binary).unwrap();

    let mut results = Results::new()
        .with_column("t", Box::new(ColumnTime::new().raw()))
        .with_column("t64", Box::new(ColumnTime64::new().raw()))
        .with_column("", Box::new(ColumnAuto::new()));
    Block::decode(&mut Reader::new(&buf[..]), &proto, &mut results).unwrap();

    let t = results.column_as::<ColumnTimeRaw>("t").unwrap();
    assert_eq!(t.row(0), Time(3_723_000_000_000));
    let t64 = results.column_as::<ColumnTime64Raw>("t64").unwrap();
    assert_eq!(t64.precision(), Some(Precision::MICRO));
    assert_eq!(t64.row(0), Time64(14_706_000_007));
    assert_eq!(results[2].name, "n");
}

#[test]
fn test_roundtrip_data_packet() {
    let proto = ProtocolVersion::CURRENT;
    let mut buf = BytesMut::new();
    block::encode_data(&mut buf, &proto, "", &sample_input(), TypeEncoding::Name)
        .unwrap();

    let mut results = Results::new();
    let (table, header) =
        block::decode_data(&mut Reader::new(&buf[..]), &proto, &mut results.auto())
            .unwrap();
    assert_eq!(table, "");
    assert_eq!(header, Block::new(3, 2));
    check_sample(&results);
}

#[test]
fn test_roundtrip_empty_block() {
    let input = Input::new().with_column(
        "t",
        Box::new(ColumnTime64::new().with_precision(Precision::MILLI)),
    );
    let results =
        roundtrip(&input, &ProtocolVersion::CURRENT, TypeEncoding::Binary);
    assert_eq!(results.len(), 1);
    assert_eq!(results.rows(), 0);
    assert_eq!(results[0].data.column_type(), "Time64(3)");
}

#[test]
fn test_mismatched_rows_rejected() {
    let mut a = ColumnTime::new();
    a.append(None);
    let input = Input::new()
        .with_column("a", Box::new(a))
        .with_column("b", Box::new(ColumnTime::new()));

    let mut buf = BytesMut::new();
    assert!(Block::encode(&mut buf, &ProtocolVersion::CURRENT, &input, TypeEncoding::Name)
        .is_err());
}

// ============================================================================
// Property Tests
// ============================================================================

fn time_of_day() -> impl Strategy<Value = NaiveTime> {
    (0u32..24, 0u32..60, 0u32..60, 0u32..1_000_000_000).prop_map(
        |(h, m, s, n)| NaiveTime::from_hms_nano_opt(h, m, s, n).unwrap(),
    )
}

proptest! {
    #[test]
    fn prop_time_round_trip(t in time_of_day()) {
        let raw = Time::from_time(&t);
        prop_assert_eq!(raw.to_naive_time(), Some(t));

        let mut col = ColumnTime::new();
        col.append_time(&t);
        let mut buf = BytesMut::new();
        col.encode_column(&mut buf);

        let mut decoded = ColumnTime::new();
        decoded.decode_column(&mut Reader::new(&buf[..]), 1).unwrap();
        prop_assert_eq!(decoded.data(), col.data());
        if raw.0 != 0 {
            let got = decoded.row(0).unwrap();
            prop_assert_eq!(
                (got.hour(), got.minute(), got.second(), got.nanosecond()),
                (t.hour(), t.minute(), t.second(), t.nanosecond())
            );
        }
    }

    #[test]
    fn prop_time64_truncates(t in time_of_day(), digits in 0u8..=9) {
        let p = Precision::new(digits).unwrap();
        let raw = Time64::from_time(&t, p);

        let scale = p.scale() as u32;
        let expected = t.with_nanosecond(t.nanosecond() / scale * scale).unwrap();
        prop_assert_eq!(raw.to_naive_time(p), Some(expected));
        prop_assert!(raw.nanos(p) <= Time::from_time(&t).0);
    }

    #[test]
    fn prop_time64_column_agreement(
        times in prop::collection::vec(time_of_day(), 0..50),
        digits in 0u8..=9,
    ) {
        let p = Precision::new(digits).unwrap();
        let mut col = ColumnTime64::new().with_precision(p);
        for t in &times {
            col.append_time(t);
        }

        let mut buf = BytesMut::new();
        col.encode_column(&mut buf);
        prop_assert_eq!(buf.len(), times.len() * 8);

        let mut decoded = ColumnTime64::new().with_precision(p);
        decoded.decode_column(&mut Reader::new(&buf[..]), times.len()).unwrap();
        prop_assert_eq!(decoded.data(), col.data());
    }
}
