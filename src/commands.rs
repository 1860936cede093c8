use anyhow::{Context, bail};
use clap::{Args, Subcommand};
use lc_auth::{AuthUser, LoginPayload, RegisterPayload, token_from_redirect};
use lc_content::{Article, ContentQuery, Video};
use lc_core::Tier;

use crate::App;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LECTERN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and log in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "LECTERN_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        tier: Option<Tier>,
    },
    /// Finish an identity-provider login from its redirect URL
    OauthCallback { url: String },
    /// Forget the current session
    Logout,
    /// Show the signed-in user
    Whoami {
        /// Refresh the user from the profile endpoint first
        #[arg(long)]
        refresh: bool,
    },
    /// Browse articles
    Articles(ContentCommand),
    /// Browse videos
    Videos(ContentCommand),
    /// Inspect or edit reading progress
    Progress(ProgressCommand),
}

#[derive(Args, Debug)]
pub struct ContentCommand {
    #[command(subcommand)]
    command: ContentSubcommand,
}

#[derive(Subcommand, Debug)]
enum ContentSubcommand {
    List(ListArgs),
    Get { id: String },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    per_page: Option<u32>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    sort_by: Option<String>,
    #[arg(long)]
    sort_order: Option<String>,
    #[arg(long)]
    tier: Option<Tier>,
    #[arg(long)]
    category: Option<String>,
}

impl From<&ListArgs> for ContentQuery {
    fn from(args: &ListArgs) -> Self {
        Self {
            page: args.page,
            per_page: args.per_page,
            search: args.search.clone(),
            sort_by: args.sort_by.clone(),
            sort_order: args.sort_order.clone(),
            access_tier: args.tier,
            category: args.category.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct ProgressCommand {
    #[command(subcommand)]
    command: ProgressSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProgressSubcommand {
    List,
    Get { id: String },
    Set { id: String, position: f64 },
    Clear { id: String },
}

impl Command {
    pub async fn run(&self, app: &App) -> anyhow::Result<()> {
        match self {
            Self::Login { email, password } => {
                let response = app
                    .auth
                    .login(&LoginPayload {
                        email: email.clone(),
                        password: password.clone(),
                    })
                    .await
                    .context("Login failed")?;
                app.session
                    .set_login_response(response.token, response.user.into());
                print_user(app);
            }
            Self::Register {
                username,
                email,
                password,
                tier,
            } => {
                let response = app
                    .auth
                    .register(&RegisterPayload {
                        username: username.clone(),
                        email: email.clone(),
                        password: password.clone(),
                        tier: *tier,
                    })
                    .await
                    .context("Registration failed")?;
                app.session
                    .set_login_response(response.token, response.user.into());
                print_user(app);
            }
            Self::OauthCallback { url } => {
                let token = token_from_redirect(url).context("Unusable redirect URL")?;
                app.session
                    .set_token(token)
                    .context("Identity provider returned an invalid token")?;
                print_user(app);
            }
            Self::Logout => {
                app.session.logout();
                println!("Logged out");
            }
            Self::Whoami { refresh } => {
                if *refresh && app.session.is_logged_in() {
                    app.session.fetch_user_profile(&app.auth).await;
                }
                print_user(app);
            }
            Self::Articles(cmd) => match &cmd.command {
                ContentSubcommand::List(args) => {
                    let page = app
                        .articles
                        .fetch_articles(&ContentQuery::from(args))
                        .await
                        .context("Failed to list articles")?;
                    for article in &page.articles {
                        print_article(app, article);
                    }
                    println!(
                        "page {}/{} ({} articles)",
                        page.page, page.total_pages, page.total
                    );
                }
                ContentSubcommand::Get { id } => {
                    let article = app
                        .articles
                        .fetch_article_by_id(id)
                        .await
                        .with_context(|| format!("Failed to fetch article {}", id))?;
                    print_article(app, &article);
                    println!("\n{}", article.content);
                }
            },
            Self::Videos(cmd) => match &cmd.command {
                ContentSubcommand::List(args) => {
                    let page = app
                        .videos
                        .fetch_videos(&ContentQuery::from(args))
                        .await
                        .context("Failed to list videos")?;
                    for video in &page.videos {
                        print_video(video);
                    }
                    println!(
                        "page {}/{} ({} videos)",
                        page.page, page.total_pages, page.total
                    );
                }
                ContentSubcommand::Get { id } => {
                    let video = app
                        .videos
                        .fetch_video_by_id(id)
                        .await
                        .with_context(|| format!("Failed to fetch video {}", id))?;
                    print_video(&video);
                    println!("{}", video.video_url);
                }
            },
            Self::Progress(cmd) => match &cmd.command {
                ProgressSubcommand::List => {
                    for (id, position) in app.progress.entries() {
                        println!("{}\t{}", id, position);
                    }
                }
                ProgressSubcommand::Get { id } => println!("{}", app.progress.get_progress(id)),
                ProgressSubcommand::Set { id, position } => {
                    if !position.is_finite() {
                        bail!("Progress must be a finite number");
                    }
                    app.progress.save_progress(id, *position);
                }
                ProgressSubcommand::Clear { id } => app.progress.clear_progress(id),
            },
        }

        Ok(())
    }
}

fn print_user(app: &App) {
    match app.session.user() {
        Some(user) => println!("{}", describe_user(&user)),
        None => println!("Not logged in"),
    }
}

fn describe_user(user: &AuthUser) -> String {
    let mut line = format!("{} <{}> [{}]", user.display_name(), user.email, user.tier);
    if let Some(provider) = &user.provider {
        line.push_str(&format!(" via {}", provider));
    }
    if let Some(expires) = user.expires_at() {
        line.push_str(&format!(", token expires {}", expires.to_rfc3339()));
    }
    line
}

fn print_article(app: &App, article: &Article) {
    let position = app.progress.get_progress(&article.id.to_string());
    let resume = if position > 0.0 {
        format!(" (resume at {})", position)
    } else {
        String::new()
    };
    println!(
        "#{} [{}] {} by {}, {}{}",
        article.id,
        article.access_tier,
        article.title,
        article.author.username,
        article.read_time,
        resume
    );
}

fn print_video(video: &Video) {
    println!(
        "#{} [{}] {}{}",
        video.id,
        video.access_tier,
        video.title,
        video
            .duration
            .as_deref()
            .map(|d| format!(" ({})", d))
            .unwrap_or_default()
    );
}
