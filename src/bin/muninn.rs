//! muninn — subreddit listing fetcher CLI
//!
//! Fetches the latest posts from a subreddit and prints them, with
//! optional AI-generated TL;DR summaries.

use clap::Parser;
use muninn::{Muninn, PostGateway};

/// Fetch the latest posts from a subreddit
#[derive(Parser)]
#[command(name = "muninn")]
#[command(version)]
#[command(about = "Fetch the latest posts from a subreddit")]
struct Args {
    /// Subreddit to fetch posts from
    #[arg(short, long, default_value = "python")]
    subreddit: String,

    /// Maximum number of posts to fetch (1-25)
    #[arg(short, long, default_value_t = 5)]
    limit: usize,

    /// Attach AI-generated TL;DR summaries (requires an OpenAI key)
    #[arg(long)]
    summaries: bool,

    /// Bypass the listing cache
    #[arg(long)]
    force_refresh: bool,

    /// Reddit API bearer token
    #[arg(long, env = "REDDIT_ACCESS_TOKEN", hide_env_values = true)]
    reddit_token: String,

    /// User agent reported to Reddit
    #[arg(long, env = "REDDIT_USER_AGENT")]
    user_agent: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_key: Option<String>,
}

#[tokio::main]
async fn main() -> muninn::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut builder = Muninn::builder().reddit_token(args.reddit_token);
    if let Some(user_agent) = args.user_agent {
        builder = builder.user_agent(user_agent);
    }
    if let Some(key) = args.openai_key {
        builder = builder.openai(key);
    }
    let gateway = builder.build()?;

    let listing = gateway
        .get_posts(
            &args.subreddit,
            args.limit,
            args.force_refresh,
            args.summaries,
        )
        .await?;

    println!("\n--- Latest posts from r/{} ---", listing.subreddit);
    for (i, post) in listing.posts.iter().enumerate() {
        println!("Post #{}", i + 1);
        println!("Title: {}", post.title);
        println!("Author: u/{}", post.author);
        println!("Upvotes: {}", post.score);
        if let Some(tldr) = &post.tldr {
            println!("TL;DR: {tldr}");
        }
        println!("---");
    }
    Ok(())
}
