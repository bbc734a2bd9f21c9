use crate::ClientRole;

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, ok};

#[test]
fn given_wire_names_when_parsed_then_roles() {
    assert_that!("SETUP".parse::<ClientRole>(), ok(eq(&ClientRole::Setup)));
    assert_that!("TEST".parse::<ClientRole>(), ok(eq(&ClientRole::Test)));
    assert_that!("DESTROY".parse::<ClientRole>(), ok(eq(&ClientRole::Destroy)));
}

#[test]
fn given_unknown_name_when_parsed_then_error() {
    assert_that!("TEARDOWN".parse::<ClientRole>(), err(anything()));
}

#[test]
fn given_role_when_displayed_then_wire_name() {
    assert_that!(ClientRole::Destroy.to_string().as_str(), eq("DESTROY"));
}
