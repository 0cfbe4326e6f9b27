use time::macros::datetime;

use super::*;

fn post(id: &str, comment_count: i64, verified: Option<i64>) -> Post {
    Post {
        id: id.to_owned(),
        title: format!("Title {id}"),
        content: String::new(),
        created_at: "2025-03-10T11:00:00Z".to_owned(),
        updated_at: None,
        author_id: None,
        author_username: "alpha".to_owned(),
        author_verified: verified,
        comment_count,
        vote_score: 0,
        upvotes: 0,
        downvotes: 0,
    }
}

#[test]
fn post_line_shows_age_comments_and_badge() {
    let now = datetime!(2025-03-10 12:00 UTC);
    let line = post_line(&post("p1", 3, Some(1)), now);
    assert!(line.contains("1h ago"));
    assert!(line.contains("3c"));
    assert!(line.contains("Title p1  by alpha [verified]  (p1)"));

    let unverified = post_line(&post("p2", 0, Some(0)), now);
    assert!(!unverified.contains("[verified]"));
}

#[test]
fn empty_feed_still_prints_footer() {
    let now = datetime!(2025-03-10 12:00 UTC);
    let feed = FeedState::new();
    let lines = feed_page(&feed, now);
    assert_eq!(lines[0], "no posts");
    assert!(lines[1].starts_with("page 1/1"));
}

#[test]
fn status_labels_are_short() {
    assert_eq!(status_label(ConnectionStatus::Connected), "live");
    assert_eq!(status_label(ConnectionStatus::Disconnected), "offline");
}

#[test]
fn toast_lines_describe_event() {
    let toast = Toast {
        id: "comment-c1-x".to_owned(),
        kind: ToastKind::NewComment,
        title: "nice post".to_owned(),
        author: "beta".to_owned(),
        post_id: "abc123".to_owned(),
        received_at: datetime!(2025-03-10 12:00 UTC),
    };
    assert_eq!(toast_line(&toast), "beta commented on abc123: nice post");
}
