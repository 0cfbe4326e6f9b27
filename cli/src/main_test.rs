use znap::api::{Page, Post};
use znap::settings::Settings;

use super::*;

fn loaded_feed(total_pages: u32) -> FeedState {
    let mut feed = FeedState::new();
    let request = feed.start();
    let page = Page::<Post> { items: Vec::new(), total: 0, page: 1, limit: 20, total_pages };
    assert!(feed.apply(request.respond(Ok(page))));
    feed
}

#[test]
fn first_page_needs_no_jump() {
    let mut feed = loaded_feed(0);
    assert!(matches!(jump_to_page(&mut feed, 1), Ok(None)));
}

#[test]
fn jump_within_range_requests_that_page() {
    let mut feed = loaded_feed(3);
    let request = jump_to_page(&mut feed, 3).unwrap().expect("page 3 exists");
    assert_eq!(request.query.page, 3);
}

#[test]
fn jump_past_last_page_is_an_error() {
    let mut feed = loaded_feed(2);
    let err = jump_to_page(&mut feed, 9).unwrap_err();
    assert!(matches!(err, CliError::Feed(_)));
    assert_eq!(err.to_string(), "page 9 is out of range (1-2)");
    assert_eq!(feed.current_page, 1);
}

#[test]
fn status_reads_saved_preference() {
    let off = znap::settings::MemoryStore::with(Settings { notifications_enabled: false });
    assert_eq!(notifications_label(&off), "off");
}

#[test]
fn status_on_corrupt_settings_falls_back_to_on() {
    let path = std::env::temp_dir().join(format!("znap-cli-status-{}.json", std::process::id()));
    std::fs::write(&path, "not json").unwrap();
    let store = JsonFileStore::new(&path);

    assert_eq!(notifications_label(&store), "on");
    let _ = std::fs::remove_file(path);
}
