//! Feed address resolution step definitions.

use cucumber::{given, then, when, World};
use runview::{resolve, SubfeedAddress};

/// Test context for feed address scenarios.
#[derive(Debug, Default, World)]
#[world(init = Self::new)]
pub struct FeedAddressWorld {
    uri: Option<String>,
    address: Option<SubfeedAddress>,
}

impl FeedAddressWorld {
    fn new() -> Self {
        Self::default()
    }

    fn address(&self) -> &SubfeedAddress {
        self.address.as_ref().expect("URI not resolved yet")
    }
}

#[given("a run without a URI")]
async fn given_no_uri(world: &mut FeedAddressWorld) {
    world.uri = None;
}

#[given(expr = "a run with URI {string}")]
async fn given_uri(world: &mut FeedAddressWorld, uri: String) {
    world.uri = Some(uri);
}

#[when("the run URI is resolved")]
async fn when_resolved(world: &mut FeedAddressWorld) {
    world.address = Some(resolve(world.uri.as_deref()));
}

#[then("the feed address is absent")]
async fn then_feed_absent(world: &mut FeedAddressWorld) {
    assert_eq!(world.address().feed_address, None);
}

#[then("the subfeed name is absent")]
async fn then_subfeed_absent(world: &mut FeedAddressWorld) {
    assert_eq!(world.address().subfeed_name, None);
}

#[then(expr = "the feed address is {string}")]
async fn then_feed_is(world: &mut FeedAddressWorld, expected: String) {
    assert_eq!(world.address().feed_address.as_deref(), Some(expected.as_str()));
}

#[then(expr = "the subfeed name is {string}")]
async fn then_subfeed_is(world: &mut FeedAddressWorld, expected: String) {
    assert_eq!(world.address().subfeed_name.as_deref(), Some(expected.as_str()));
}

#[then("the address is complete")]
async fn then_complete(world: &mut FeedAddressWorld) {
    assert!(world.address().is_complete());
}

#[then("the address is incomplete")]
async fn then_incomplete(world: &mut FeedAddressWorld) {
    assert!(!world.address().is_complete());
}
