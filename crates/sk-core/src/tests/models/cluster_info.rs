use crate::{ClusterInfo, ServerInfo};

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, none, ok, some};
use proptest::prelude::*;

fn two_servers() -> ClusterInfo {
    ClusterInfo::new(vec![
        ServerInfo::new("testServer0", 9410, 9430),
        ServerInfo::new("testServer1", 9411, 9431),
    ])
}

// =========================================================================
// Encoding
// =========================================================================

#[test]
fn given_two_servers_when_encoded_then_records_joined_with_semicolon() {
    // Given
    let info = two_servers();

    // When
    let encoded = info.encode();

    // Then
    assert_that!(
        encoded.as_str(),
        eq("testServer0,9410,9430;testServer1,9411,9431")
    );
}

#[test]
fn given_encoded_string_when_decoded_then_servers_in_order() {
    // Given
    let encoded = "a,1,2;b,3,4";

    // When
    let result = ClusterInfo::decode(encoded);

    // Then
    assert_that!(result, ok(anything()));
    let info = result.unwrap();
    assert_that!(info.len(), eq(2));
    assert_that!(info.servers()[0], eq(&ServerInfo::new("a", 1, 2)));
    assert_that!(info.servers()[1], eq(&ServerInfo::new("b", 3, 4)));
}

#[test]
fn given_cluster_info_when_lookup_by_name_then_finds_server() {
    // Given
    let info = two_servers();

    // When / Then
    assert_that!(
        info.server("testServer1").map(|s| s.tsa_port),
        some(eq(9411))
    );
    assert_that!(info.server("missing"), none());
}

#[test]
fn given_cluster_info_when_connect_uri_then_lists_every_tsa_port() {
    // Given
    let info = two_servers();

    // When
    let uri = info.connect_uri("terracotta", "localhost");

    // Then
    assert_that!(
        uri.as_str(),
        eq("terracotta://localhost:9410,localhost:9411")
    );
}

// =========================================================================
// Malformed input
// =========================================================================

#[test]
fn given_empty_string_when_decoded_then_error() {
    assert_that!(ClusterInfo::decode(""), err(anything()));
}

#[test]
fn given_record_with_missing_field_when_decoded_then_error() {
    assert_that!(ClusterInfo::decode("a,1"), err(anything()));
}

#[test]
fn given_record_with_extra_field_when_decoded_then_error() {
    assert_that!(ClusterInfo::decode("a,1,2,3"), err(anything()));
}

#[test]
fn given_non_numeric_port_when_decoded_then_error() {
    assert_that!(ClusterInfo::decode("a,one,2"), err(anything()));
}

#[test]
fn given_port_out_of_range_when_decoded_then_error() {
    assert_that!(ClusterInfo::decode("a,70000,2"), err(anything()));
}

#[test]
fn given_empty_server_name_when_decoded_then_error() {
    assert_that!(ClusterInfo::decode(",1,2"), err(anything()));
}

#[test]
fn given_trailing_separator_when_decoded_then_error() {
    assert_that!(ClusterInfo::decode("a,1,2;"), err(anything()));
}

// =========================================================================
// Property-Based Tests
// =========================================================================

fn server_info_strategy() -> impl Strategy<Value = ServerInfo> {
    ("[a-zA-Z][a-zA-Z0-9_.-]{0,15}", any::<u16>(), any::<u16>())
        .prop_map(|(name, tsa, group)| ServerInfo::new(name, tsa, group))
}

proptest! {
    #[test]
    fn given_any_non_empty_server_set_when_encoded_and_decoded_then_equal(
        servers in prop::collection::vec(server_info_strategy(), 1..8)
    ) {
        let info = ClusterInfo::new(servers);

        let decoded = ClusterInfo::decode(&info.encode());

        prop_assert!(decoded.is_ok());
        prop_assert_eq!(decoded.unwrap(), info);
    }

    #[test]
    fn given_any_cluster_info_when_displayed_then_parses_back(
        servers in prop::collection::vec(server_info_strategy(), 1..4)
    ) {
        let info = ClusterInfo::new(servers);

        let parsed: Result<ClusterInfo, _> = info.to_string().parse();

        prop_assert_eq!(parsed.ok(), Some(info));
    }
}
