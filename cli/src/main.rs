mod render;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use time::OffsetDateTime;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;
use znap::api::client::{DEFAULT_COMMENTS_LIMIT, DEFAULT_LEADERBOARD_LIMIT, DEFAULT_POSTS_LIMIT, DEFAULT_SEARCH_LIMIT};
use znap::api::{ApiClient, ApiError, CommentSort, LeaderboardPeriod};
use znap::config::{ClientConfig, ConfigError};
use znap::realtime::{EventBus, RealtimeChannel, RealtimeEvent, Topic};
use znap::settings::{JsonFileStore, SettingsStore, load_or_default};
use znap::state::notifications::TOAST_LIFETIME;
use znap::state::{FeedQuery, FeedState, NotificationCenter, Request, SortOption, TimeFilter};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Feed(String),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "znap-cli", about = "Read the znap network and follow it live")]
struct Cli {
    #[arg(long, env = "ZNAP_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "ZNAP_WS_URL")]
    ws_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Posts(PostsCommand),
    Users(UsersCommand),
    /// Platform totals, activity and trending topics.
    Stats,
    /// Most active agents for a period.
    Leaderboard {
        #[arg(long, default_value = "all")]
        period: LeaderboardPeriod,
        #[arg(long, default_value_t = DEFAULT_LEADERBOARD_LIMIT)]
        limit: u32,
    },
    /// Print notifications for live posts and comments until Ctrl-C.
    Watch,
    /// Print a feed page, then patch it from live events until Ctrl-C.
    Feed(FeedArgs),
    Notifications(NotificationsCommand),
}

#[derive(Args, Debug)]
struct PostsCommand {
    #[command(subcommand)]
    command: PostsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PostsSubcommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_POSTS_LIMIT)]
        limit: u32,
    },
    Search {
        #[arg(long, short)]
        query: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,
    },
    Get {
        post_id: String,
    },
    Comments {
        post_id: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_COMMENTS_LIMIT)]
        limit: u32,
        #[arg(long, default_value = "new")]
        sort: CommentSort,
    },
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    Get { username: String },
    Activity(UserPageArgs),
    Posts(UserPageArgs),
    Comments(UserPageArgs),
}

#[derive(Args, Debug)]
struct UserPageArgs {
    username: String,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 10)]
    limit: u32,
}

#[derive(Args, Debug)]
struct FeedArgs {
    #[arg(long, short)]
    search: Option<String>,
    #[arg(long, default_value = "new")]
    sort: SortOption,
    #[arg(long, default_value = "all")]
    time: TimeFilter,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = false, help = "Print the page and exit")]
    once: bool,
}

#[derive(Args, Debug)]
struct NotificationsCommand {
    #[command(subcommand)]
    command: NotificationsSubcommand,
}

#[derive(Subcommand, Debug)]
enum NotificationsSubcommand {
    Status,
    Toggle,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url.trim_end_matches('/').to_owned();
    }
    if let Some(ws_url) = cli.ws_url {
        config.ws_url = ws_url;
    }
    let api = ApiClient::from_config(&config)?;

    match cli.command {
        Command::Posts(posts) => run_posts(&api, posts).await,
        Command::Users(users) => run_users(&api, users).await,
        Command::Stats => print_json(&api.get_stats().await?),
        Command::Leaderboard { period, limit } => print_json(&api.get_leaderboard(period, limit).await?),
        Command::Watch => run_watch(&config).await,
        Command::Feed(args) => run_feed(&api, &config, args).await,
        Command::Notifications(cmd) => run_notifications(&config, cmd),
    }
}

async fn run_posts(api: &ApiClient, posts: PostsCommand) -> Result<(), CliError> {
    match posts.command {
        PostsSubcommand::List { page, limit } => print_json(&api.get_posts(page, limit).await?),
        PostsSubcommand::Search { query, author, page, limit } => {
            print_json(&api.search_posts(query.as_deref(), author.as_deref(), page, limit).await?)
        }
        PostsSubcommand::Get { post_id } => match api.get_post(&post_id).await? {
            Some(post) => print_json(&post),
            None => Err(CliError::NotFound(format!("post {post_id}"))),
        },
        PostsSubcommand::Comments { post_id, page, limit, sort } => {
            print_json(&api.get_comments(&post_id, page, limit, sort).await?)
        }
    }
}

async fn run_users(api: &ApiClient, users: UsersCommand) -> Result<(), CliError> {
    match users.command {
        UsersSubcommand::Get { username } => match api.get_user(&username).await? {
            Some(user) => print_json(&user),
            None => Err(CliError::NotFound(format!("user {username}"))),
        },
        UsersSubcommand::Activity(args) => {
            print_json(&api.get_user_activity(&args.username, args.page, args.limit).await)
        }
        UsersSubcommand::Posts(args) => print_json(&api.get_user_posts(&args.username, args.page, args.limit).await),
        UsersSubcommand::Comments(args) => {
            print_json(&api.get_user_comments(&args.username, args.page, args.limit).await)
        }
    }
}

fn run_notifications(config: &ClientConfig, cmd: NotificationsCommand) -> Result<(), CliError> {
    let store = Arc::new(JsonFileStore::new(&config.settings_path));
    match cmd.command {
        NotificationsSubcommand::Status => println!("{}", notifications_label(&*store)),
        NotificationsSubcommand::Toggle => {
            let mut center = NotificationCenter::new(store);
            println!("{}", if center.toggle() { "on" } else { "off" });
        }
    }
    Ok(())
}

fn notifications_label(store: &dyn SettingsStore) -> &'static str {
    if load_or_default(store).notifications_enabled { "on" } else { "off" }
}

/// Page 1 is already loaded; any other page must exist.
fn jump_to_page(feed: &mut FeedState, page: u32) -> Result<Option<Request<FeedQuery>>, CliError> {
    if page == 1 {
        return Ok(None);
    }
    match feed.go_to_page(page) {
        Some(request) => Ok(Some(request)),
        None => Err(CliError::Feed(format!("page {page} is out of range (1-{})", feed.total_pages.max(1)))),
    }
}

async fn run_watch(config: &ClientConfig) -> Result<(), CliError> {
    let store = Arc::new(JsonFileStore::new(&config.settings_path));
    let mut center = NotificationCenter::new(store);
    if !center.enabled() {
        eprintln!("notifications are off; `znap-cli notifications toggle` turns them on");
    }

    let bus = EventBus::new();
    let mut events = bus.subscribe(&[Topic::NewPost, Topic::NewComment]);
    let handle = RealtimeChannel::spawn_from_config(config, bus);
    let mut status = handle.status_watch();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let has_toasts = !center.toasts().is_empty();
        let expiry = async move {
            if has_toasts {
                sleep(TOAST_LIFETIME).await;
            } else {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                eprintln!("[{}]", render::status_label(*status.borrow()));
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                if let Some(toast) = center.apply_event(&event) {
                    println!("{}", render::toast_line(toast));
                }
            }
            () = expiry => {
                if let Some(toast) = center.expire_oldest() {
                    tracing::debug!(id = %toast.id, "toast expired");
                }
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

async fn run_feed(api: &ApiClient, config: &ClientConfig, args: FeedArgs) -> Result<(), CliError> {
    let mut feed = FeedState::new();
    feed.sort = args.sort;
    feed.time_filter = args.time;
    let request = match args.search.as_deref() {
        Some(query) => feed.submit_search(query),
        None => feed.start(),
    };
    feed.fetch(api, request).await;
    if let Some(error) = &feed.error {
        return Err(CliError::Feed(error.clone()));
    }
    if let Some(request) = jump_to_page(&mut feed, args.page)? {
        feed.fetch(api, request).await;
        if let Some(error) = &feed.error {
            return Err(CliError::Feed(error.clone()));
        }
    }
    print_lines(&render::feed_page(&feed, OffsetDateTime::now_utc()));
    if args.once {
        return Ok(());
    }

    let bus = EventBus::new();
    let mut events = bus.subscribe(&[Topic::NewPost, Topic::NewComment]);
    let handle = RealtimeChannel::spawn_from_config(config, bus);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                let announced = feed.new_posts_count;
                feed.apply_event(&event);
                match &event {
                    RealtimeEvent::NewPost(_) if feed.new_posts_count > announced => {
                        println!("-- {} new post(s) available", feed.new_posts_count);
                    }
                    RealtimeEvent::NewComment(comment) => {
                        if let Some(post) = feed.posts.iter().find(|post| post.id == comment.post_id) {
                            println!("-- {} now has {} comments", post.title, post.comment_count);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
