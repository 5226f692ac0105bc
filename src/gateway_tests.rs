// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `gateway.rs`

use super::*;

#[test]
fn test_parse_canonical_id() {
    let gw: GatewayId = "gw01n03".parse().unwrap();
    assert_eq!(gw.cluster(), 1);
    assert_eq!(gw.node(), 3);
    assert_eq!(gw.to_string(), "gw01n03");
}

#[test]
fn test_parse_rejects_bad_ids() {
    for bad in ["", "gw1n03", "gw01x03", "gw01n3", "gw01n033", "ns01n03", "gw+1n03"] {
        assert!(bad.parse::<GatewayId>().is_err(), "accepted {bad:?}");
    }
}

#[test]
fn test_backbone_addr_concatenates_unpadded() {
    let gw = GatewayId::new(1, 3);
    assert_eq!(gw.backbone_addr(), "10.191.255.13");

    let gw: GatewayId = "gw07n01".parse().unwrap();
    assert_eq!(gw.backbone_addr(), "10.191.255.71");

    let gw: GatewayId = "gw09n02".parse().unwrap();
    assert_eq!(gw.backbone_addr(), "10.191.255.92");
}

#[test]
fn test_public_host() {
    let gw: GatewayId = "gw07n01".parse().unwrap();
    assert_eq!(
        gw.public_host("gw.freifunk-stuttgart.de"),
        "gw07n01.gw.freifunk-stuttgart.de"
    );
}

#[test]
fn test_segment_alias_zero_pads() {
    let gw: GatewayId = "gw01n03".parse().unwrap();
    assert_eq!(
        gw.segment_alias(Segment::new(2), "gw.freifunk-stuttgart.de"),
        "gw01s02.gw.freifunk-stuttgart.de"
    );
}

#[test]
fn test_ordering_matches_lexicographic_names() {
    let mut ids: Vec<GatewayId> = ["gw09n02", "gw01n03", "gw07n01", "gw01n02"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    ids.sort();

    let names: Vec<String> = ids.iter().map(ToString::to_string).collect();
    assert_eq!(names, vec!["gw01n02", "gw01n03", "gw07n01", "gw09n02"]);
}

#[test]
fn test_segment_parse_accepts_leading_zero() {
    assert_eq!("1".parse::<Segment>().unwrap(), Segment::new(1));
    assert_eq!("01".parse::<Segment>().unwrap(), Segment::new(1));
    assert!("one".parse::<Segment>().is_err());
}

#[test]
fn test_segment_display_is_plain_number() {
    assert_eq!(Segment::new(7).to_string(), "7");
}
