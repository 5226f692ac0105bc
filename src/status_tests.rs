// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `status.rs`

use super::*;

#[test]
fn test_deserialize_status_document() {
    let raw = r#"{
        "version": "1",
        "timestamp": 1693526400,
        "segments": {
            "1": { "preference": 50, "dnsactive": 1 },
            "2": { "preference": 22, "dnsactive": 0 }
        }
    }"#;

    let doc: StatusDocument = serde_json::from_str(raw).unwrap();
    assert_eq!(doc.version, "1");
    assert_eq!(doc.timestamp, 1_693_526_400);
    assert_eq!(doc.segments.len(), 2);
    assert!(doc.segments["1"].is_dns_active());
    assert!(!doc.segments["2"].is_dns_active());
    assert_eq!(doc.segments["2"].preference, 22);
}

#[test]
fn test_dnsactive_defaults_to_inactive() {
    // The status generator omits dnsactive until the balancer has run once.
    let raw = r#"{"version":"1","timestamp":0,"segments":{"1":{"preference":80}}}"#;
    let doc: StatusDocument = serde_json::from_str(raw).unwrap();
    assert!(!doc.segments["1"].is_dns_active());
}

#[test]
fn test_segments_default_to_empty() {
    let raw = r#"{"version":"1","timestamp":0}"#;
    let doc: StatusDocument = serde_json::from_str(raw).unwrap();
    assert!(doc.segments.is_empty());
}

#[test]
fn test_preference_is_not_range_limited() {
    let raw = r#"{"version":"1","timestamp":0,"segments":{"1":{"preference":-40}}}"#;
    let doc: StatusDocument = serde_json::from_str(raw).unwrap();
    assert_eq!(doc.segments["1"].preference, -40);
}

#[test]
fn test_segment_status_groups_by_segment() {
    let gw1: GatewayId = "gw01n03".parse().unwrap();
    let gw2: GatewayId = "gw07n01".parse().unwrap();

    let mut status = SegmentStatus::new();
    status.insert(
        Segment::new(1),
        gw1,
        SegmentReport {
            preference: 19,
            dnsactive: 1,
        },
    );
    status.insert(
        Segment::new(1),
        gw2,
        SegmentReport {
            preference: 50,
            dnsactive: 1,
        },
    );
    status.insert(
        Segment::new(2),
        gw1,
        SegmentReport {
            preference: 19,
            dnsactive: 0,
        },
    );

    assert_eq!(status.len(), 2);
    assert_eq!(status.segment(Segment::new(1)).unwrap().len(), 2);
    assert!(status.segment(Segment::new(3)).is_none());

    let segments: Vec<Segment> = status.iter().map(|(segment, _)| segment).collect();
    assert_eq!(segments, vec![Segment::new(1), Segment::new(2)]);
}

#[test]
fn test_empty_status() {
    let status = SegmentStatus::new();
    assert!(status.is_empty());
    assert_eq!(status.len(), 0);
}
