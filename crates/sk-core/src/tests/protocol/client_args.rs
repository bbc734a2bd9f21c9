use crate::{ClientArgs, ClientRole, ClusterInfo, ServerInfo};

use clap::Parser;
use googletest::assert_that;
use googletest::prelude::{anything, eq, err, none, ok, some};

fn test_args(error_class: Option<&str>) -> ClientArgs {
    ClientArgs {
        task: ClientRole::Test,
        test_class: "org.example.FailoverIT".to_string(),
        connect_uri: "terracotta://localhost:9410".to_string(),
        cluster_info: ClusterInfo::new(vec![ServerInfo::new("testServer0", 9410, 9430)]),
        number_of_stripes: 1,
        number_of_servers_per_stripe: 1,
        total_client_count: 2,
        this_client_index: 1,
        error_class: error_class.map(str::to_string),
    }
}

#[test]
fn given_rendered_args_when_parsed_then_equal() {
    // Given
    let args = test_args(Some("org.example.Errors"));
    let mut argv = vec!["client".to_string()];
    argv.extend(args.to_args());

    // When
    let result = ClientArgs::try_parse_from(argv);

    // Then
    assert_that!(result, ok(eq(&args)));
}

#[test]
fn given_no_error_class_when_rendered_then_flag_omitted() {
    // Given
    let args = test_args(None);

    // When
    let rendered = args.to_args();

    // Then
    assert_that!(rendered.iter().any(|a| a == "--errorClass"), eq(false));
    assert_that!(rendered.len(), eq(16));
}

#[test]
fn given_setup_task_when_parsed_then_setup_role() {
    // Given
    let argv = [
        "client",
        "--task",
        "SETUP",
        "--testClass",
        "T",
        "--connectUri",
        "terracotta://localhost:1",
        "--clusterInfo",
        "s,1,2",
        "--numberOfStripes",
        "1",
        "--numberOfServersPerStripe",
        "1",
        "--totalClientCount",
        "1",
        "--thisClientIndex",
        "0",
    ];

    // When
    let parsed = ClientArgs::try_parse_from(argv).unwrap();

    // Then
    assert_that!(parsed.task, eq(ClientRole::Setup));
    assert_that!(parsed.cluster_info.len(), eq(1));
    assert_that!(parsed.error_class, none());
}

#[test]
fn given_malformed_cluster_info_when_parsed_then_error() {
    // Given
    let argv = [
        "client",
        "--task",
        "TEST",
        "--testClass",
        "T",
        "--connectUri",
        "u",
        "--clusterInfo",
        "s,1",
        "--numberOfStripes",
        "1",
        "--numberOfServersPerStripe",
        "1",
        "--totalClientCount",
        "1",
        "--thisClientIndex",
        "0",
    ];

    // When / Then
    assert_that!(ClientArgs::try_parse_from(argv), err(anything()));
}

#[test]
fn given_error_class_when_parsed_then_present() {
    // Given
    let mut argv = vec!["client".to_string()];
    argv.extend(test_args(Some("E")).to_args());

    // When
    let parsed = ClientArgs::try_parse_from(argv).unwrap();

    // Then
    assert_that!(parsed.error_class.as_deref(), some(eq("E")));
}
