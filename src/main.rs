use chrono::Local;
use clap::{Parser, Subcommand};
use feedsync::types::events::ListEventKind;
use feedsync::{Client, ClientConfig, FeedItem, FetchOutcome, QueryIdentity, RequestOrigin};
use feedsync_ureq_http_client::UreqHttpClient;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;

// Small command line front end for browsing a feed backend.
//
// Usage:
//   cargo run -- --token $TOKEN me
//   cargo run -- feed --pages 3
//   cargo run -- comments 42
//   cargo run -- --base-url https://example.org/api friends 7

#[derive(Parser)]
#[command(name = "feedsync")]
#[command(about = "Paginated feed client")]
struct Cli {
    /// API root every endpoint path is appended to
    #[arg(long, default_value = "http://localhost:8080/api")]
    base_url: String,

    /// Bearer token
    #[arg(long, env = "FEEDSYNC_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Items per page
    #[arg(long, default_value_t = 10)]
    page_size: u32,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the logged-in user
    Me,
    /// List posts, globally or for one user
    Feed {
        #[arg(long)]
        user: Option<i64>,
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    Comments {
        post_id: i64,
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    Likers {
        post_id: i64,
    },
    Friends {
        user_id: i64,
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    Requests {
        user_id: i64,
    },
    Chats {
        user_id: i64,
    },
    Notifications {
        user_id: i64,
    },
    /// Toggle the like on a post
    Like {
        post_id: i64,
    },
    /// Accept a friend request
    Accept {
        me: i64,
        requester_id: i64,
    },
    /// Mark a notification as read
    Read {
        me: i64,
        notification_id: i64,
    },
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{:<5}] [{}] - {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to build tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(cli)) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ClientConfig::default()
        .with_base_url(cli.base_url)
        .with_page_size(cli.page_size)
        .with_request_timeout(Duration::from_secs(cli.timeout));

    let mut builder = Client::builder()
        .with_http_client(Arc::new(UreqHttpClient::new()))
        .with_config(config);
    match cli.token {
        Some(token) => builder = builder.with_token(token),
        None => warn!("No token given; requests will not be sent"),
    }
    let client = Arc::new(builder.build()?);

    let mut list_events = client.event_bus.list_updated.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = list_events.recv().await {
            if let ListEventKind::PageAppended { page_no, items } = &event.kind {
                debug!(target: "Cache", "{}: page {page_no} (+{items})", event.identity);
            }
        }
    });

    match cli.command {
        Commands::Me => {
            let me = client.users().current().await?;
            info!("Logged in as {} {} (#{})", me.first_name, me.last_name, me.user_id);
        }
        Commands::Feed { user, pages } => {
            let identity = user.map_or_else(QueryIdentity::all_posts, QueryIdentity::user_posts);
            print_pages(&client, identity, pages).await?;
        }
        Commands::Comments { post_id, pages } => {
            print_pages(&client, QueryIdentity::post_comments(post_id), pages).await?;
        }
        Commands::Likers { post_id } => {
            print_pages(&client, QueryIdentity::post_likers(post_id), 1).await?;
        }
        Commands::Friends { user_id, pages } => {
            print_pages(&client, QueryIdentity::friend_list(user_id), pages).await?;
        }
        Commands::Requests { user_id } => {
            print_pages(&client, QueryIdentity::friend_requests(user_id), 1).await?;
        }
        Commands::Chats { user_id } => {
            print_pages(&client, QueryIdentity::user_chats(user_id), 1).await?;
        }
        Commands::Notifications { user_id } => {
            print_pages(&client, QueryIdentity::notifications(user_id), 1).await?;
        }
        Commands::Like { post_id } => {
            client
                .posts()
                .toggle_like(&QueryIdentity::all_posts(), post_id)
                .await?;
            let liked = client.posts().is_liked(post_id).await?;
            let count = client.posts().like_count(post_id).await?;
            info!("Post {post_id}: liked={liked}, {count} like(s)");
        }
        Commands::Accept { me, requester_id } => {
            client
                .friends()
                .accept(me, requester_id, RequestOrigin::RequestList)
                .await?;
            info!("Accepted friend request from {requester_id}");
        }
        Commands::Read {
            me,
            notification_id,
        } => {
            let outcome = client
                .notifications()
                .mark_as_read(me, notification_id)
                .await?;
            info!("Notification {notification_id}: {outcome:?}");
        }
    }
    Ok(())
}

async fn print_pages(client: &Client, identity: QueryIdentity, pages: u32) -> anyhow::Result<()> {
    for _ in 0..pages {
        match client.fetch_next_page(&identity).await? {
            FetchOutcome::Exhausted { .. } => break,
            FetchOutcome::Appended { has_more, .. } if !has_more => break,
            _ => {}
        }
    }

    let items = client.cache().items(&identity);
    info!("{identity}: {} item(s)", items.len());
    for item in &items {
        println!("{}", describe(item));
    }
    Ok(())
}

fn describe(item: &FeedItem) -> String {
    match item {
        FeedItem::Post(p) => format!(
            "#{} {} {}: {} [{} like(s), {} comment(s)]",
            p.post_id,
            p.first_name,
            p.last_name,
            p.content.as_deref().unwrap_or(""),
            p.like_count,
            p.comment_count
        ),
        FeedItem::Comment(c) => format!(
            "#{} {} {}: {}",
            c.post_comment_id,
            c.first_name,
            c.last_name,
            c.comment.as_deref().unwrap_or("")
        ),
        FeedItem::Chat(c) => format!(
            "#{} {}: {}",
            c.chat_id,
            c.display_name(),
            c.latest_message.as_deref().unwrap_or("")
        ),
        FeedItem::Notification(n) => format!(
            "#{} {}{} {}",
            n.notification_id,
            if n.read { "" } else { "* " },
            n.sender.full_name(),
            n.message
        ),
        FeedItem::User(u) => format!("#{} {}", u.user_id, u.full_name()),
    }
}
