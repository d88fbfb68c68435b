pub mod fixtures;

use envspec::prelude::*;
use fixtures::*;
use proptest::prelude::*;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

fn finite_f64() -> impl Strategy<Value = f64> {
    prop_oneof![
        any::<f64>().prop_filter("finite", |v| v.is_finite()),
        Just(-0.0),
        Just(f64::MAX),
        Just(f64::MIN),
        Just(f64::MIN_POSITIVE),
        Just(-1.5e-300),
        Just(6.02e300),
    ]
}

fn socket_addr() -> impl Strategy<Value = SocketAddr> {
    let ip = prop_oneof![
        any::<[u8; 4]>().prop_map(|octets| IpAddr::from(Ipv4Addr::from(octets))),
        any::<[u16; 8]>().prop_map(|segments| IpAddr::from(Ipv6Addr::from(segments))),
    ];
    (ip, any::<u16>()).prop_map(|(ip, port)| SocketAddr::new(ip, port))
}

proptest! {
    #[test]
    fn prop_numeric_literal_roundtrip(value in any::<i64>()) {
        let (_, registry) = setup(&[("N", value.to_string().as_str())]);
        let n = declare(&registry, SpecBuilder::new("N", "Number", NumericSchema::<i64>::new()));

        prop_assert_eq!(n.value(), Ok(Some(value)));
        prop_assert!(n.literal().is_some_and(|l| l.is_canonical()));
    }

    #[test]
    fn prop_numeric_range_is_inclusive(value in any::<i16>()) {
        let (_, registry) = setup(&[("LEVEL", value.to_string().as_str())]);
        let level = declare(
            &registry,
            SpecBuilder::new("LEVEL", "Level", NumericSchema::<i16>::new().min(-10).max(20)),
        );

        prop_assert_eq!(level.is_valid(), (-10..=20).contains(&value));
    }

    #[test]
    fn prop_binary_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 1..64)) {
        let encoding = BinaryEncoding::Base64Url;
        let (_, registry) = setup(&[("KEY", encoding.encode(&bytes).as_str())]);
        let key = declare(
            &registry,
            SpecBuilder::new("KEY", "Key", BinarySchema::<Vec<u8>>::new(encoding)),
        );

        prop_assert_eq!(key.value(), Ok(Some(bytes)));
    }

    #[test]
    fn prop_string_within_bounds_is_verbatim(text in "[a-z]{2,8}") {
        let (_, registry) = setup(&[("NAME", text.as_str())]);
        let name = declare(
            &registry,
            SpecBuilder::new("NAME", "Name", StringSchema::<String>::new().min_len(2).max_len(8)),
        );

        prop_assert_eq!(name.value(), Ok(Some(text)));
    }

    #[test]
    fn prop_float_literal_roundtrip(value in finite_f64()) {
        let (_, registry) = setup(&[("RATIO", value.to_string().as_str())]);
        let ratio = declare(&registry, SpecBuilder::new("RATIO", "Ratio", NumericSchema::<f64>::new()));

        let parsed = ratio.value().ok().flatten();
        prop_assert_eq!(parsed.map(f64::to_bits), Some(value.to_bits()));
        prop_assert!(ratio.literal().is_some_and(|l| l.is_canonical()));
    }

    #[test]
    fn prop_set_member_roundtrip(index in 0usize..3) {
        let (color, literal) = [(Color::Red, "red"), (Color::Green, "green"), (Color::Blue, "blue")][index];
        let (_, registry) = setup(&[("COLOR", literal)]);
        let var = declare(&registry, SpecBuilder::new("COLOR", "Color", color_schema()));

        prop_assert_eq!(var.value(), Ok(Some(color)));
        prop_assert_eq!(var.literal().map(|l| l.canonical().to_owned()), Some(literal.to_owned()));
    }

    #[test]
    fn prop_socket_addr_roundtrip(addr in socket_addr()) {
        let (_, registry) = setup(&[("LISTEN", addr.to_string().as_str())]);
        let listen = declare(
            &registry,
            SpecBuilder::new("LISTEN", "Listen address", OtherSchema::<SocketAddr>::parsed()),
        );

        prop_assert_eq!(listen.value(), Ok(Some(addr)));
        prop_assert!(listen.literal().is_some_and(|l| l.is_canonical()));
    }
}
