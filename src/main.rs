#![windows_subsystem = "windows"]
mod avatar;
mod client;
mod config;
mod error;
mod models;
mod widget;
slint::include_modules!();

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use client::GitHubClient;
use config::Config;
use widget::{Phase, ProfileLookup};

const AVATAR_SIZE: u32 = 128;
const AVATAR_TIMEOUT: Duration = Duration::from_secs(10);

fn main() -> anyhow::Result<()> {
    // Load .env variables
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contribution_checker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    if config.token.is_none() {
        warn!("GITHUB_TOKEN is not set; contribution lookups will fail");
    }

    let github = GitHubClient::new(&config)?;

    // Background tokio runtime for async HTTP
    let rt = Arc::new(tokio::runtime::Runtime::new()?);

    let state = Arc::new(Mutex::new(ProfileLookup::new()));

    let app = AppWindow::new()?;

    // =============================================
    //  CALLBACK: submit-requested
    // =============================================
    {
        let app_weak = app.as_weak();
        let github = github.clone();
        let rt = rt.clone();
        let state = state.clone();

        app.on_submit_requested(move |query| {
            let Some(app) = app_weak.upgrade() else { return };

            let started = lock(&state).begin(&query);
            render(&app, &lock(&state));
            app.set_avatar(slint::Image::default());
            let Ok(username) = started else { return };

            let app_weak = app_weak.clone();
            let github = github.clone();
            let state = state.clone();

            rt.spawn(async move {
                let outcome = widget::fetch_snapshot(&github, &username).await;
                let avatar_url = outcome
                    .as_ref()
                    .ok()
                    .map(|snapshot| snapshot.profile.avatar_url.clone());

                // Commit the lookup before the avatar so a slow CDN never
                // keeps the window in Loading.
                {
                    let app_weak = app_weak.clone();
                    let state = state.clone();
                    let _ = slint::invoke_from_event_loop(move || {
                        let Some(app) = app_weak.upgrade() else { return };

                        let mut lookup = lock(&state);
                        lookup.finish(outcome);
                        render(&app, &lookup);
                        app.set_avatar(slint::Image::default());
                    });
                }

                let Some(avatar_url) = avatar_url else { return };
                let pixels =
                    avatar::download(github.http(), &avatar_url, AVATAR_SIZE, AVATAR_TIMEOUT)
                        .await;

                let _ = slint::invoke_from_event_loop(move || {
                    let Some(app) = app_weak.upgrade() else { return };
                    // A newer attempt may have replaced the card meanwhile.
                    if !lock(&state).shows_avatar(&avatar_url) {
                        return;
                    }

                    let image = match pixels {
                        Some((pixels, w, h)) => {
                            let buf = slint::SharedPixelBuffer::<slint::Rgba8Pixel>::clone_from_slice(
                                &pixels, w, h,
                            );
                            slint::Image::from_rgba8(buf)
                        }
                        None => slint::Image::default(),
                    };
                    app.set_avatar(image);
                });
            });
        });
    }

    // =============================================
    //  CALLBACK: claim-reward
    // =============================================
    {
        let app_weak = app.as_weak();
        let state = state.clone();

        app.on_claim_reward(move || {
            let Some(app) = app_weak.upgrade() else { return };
            if let Some(message) = lock(&state).claim_reward() {
                info!("{message}");
                app.set_reward_message(message.into());
            }
        });
    }

    // =============================================
    //  CALLBACK: profile-clicked
    // =============================================
    app.on_profile_clicked(|url| {
        if let Err(e) = open::that(url.as_str()) {
            warn!(%url, "could not open browser: {e}");
        }
    });

    render(&app, &lock(&state));

    // Run the Slint event loop
    app.run()?;

    Ok(())
}

fn lock(state: &Mutex<ProfileLookup>) -> MutexGuard<'_, ProfileLookup> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Copies the widget state into the window properties.
fn render(app: &AppWindow, lookup: &ProfileLookup) {
    app.set_is_loading(lookup.phase() == Phase::Loading);
    app.set_error_message(
        lookup
            .error()
            .map(|e| e.to_string())
            .unwrap_or_default()
            .into(),
    );

    let Some(card) = lookup.card() else {
        app.set_has_profile(false);
        return;
    };

    app.set_display_name(card.display_name.into());
    app.set_handle(card.handle.into());
    app.set_bio(card.bio.into());
    app.set_followers(card.followers.into());
    app.set_following(card.following.into());
    app.set_repos(card.repos.into());
    app.set_contributions(card.contributions.into());
    app.set_profile_url(card.profile_url.into());
    app.set_has_profile(true);
}
