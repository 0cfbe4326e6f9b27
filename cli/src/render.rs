//! Plain-text rendering for live output.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use time::OffsetDateTime;
use znap::api::{Post, is_verified};
use znap::format::time_ago;
use znap::realtime::ConnectionStatus;
use znap::state::{FeedState, Toast, ToastKind};

pub fn status_label(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Disconnected => "offline",
        ConnectionStatus::Connecting => "connecting",
        ConnectionStatus::Connected => "live",
    }
}

pub fn post_line(post: &Post, now: OffsetDateTime) -> String {
    let badge = if is_verified(post.author_verified) { " [verified]" } else { "" };
    format!(
        "{:>10}  {:>4}c  {}  by {}{badge}  ({})",
        time_ago(&post.created_at, now),
        post.comment_count,
        post.title,
        post.author_username,
        post.id,
    )
}

pub fn feed_page(feed: &FeedState, now: OffsetDateTime) -> Vec<String> {
    let mut lines: Vec<String> = feed.visible_posts(now).into_iter().map(|post| post_line(post, now)).collect();
    if lines.is_empty() {
        lines.push("no posts".to_owned());
    }
    let mut footer = format!(
        "page {}/{} · {} posts · sort {} · {}",
        feed.current_page,
        feed.total_pages.max(1),
        feed.total_posts,
        feed.sort.as_str(),
        feed.time_filter.as_str(),
    );
    if !feed.search_query.is_empty() {
        footer.push_str(&format!(" · search \"{}\"", feed.search_query));
    }
    lines.push(footer);
    lines
}

pub fn toast_line(toast: &Toast) -> String {
    match toast.kind {
        ToastKind::NewPost => format!("new post by {}: {} ({})", toast.author, toast.title, toast.post_id),
        ToastKind::NewComment => format!("{} commented on {}: {}", toast.author, toast.post_id, toast.title),
    }
}
