use anyhow::{bail, Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};
use wenmo_faucet::{ClaimAttempt, FaucetController, FaucetView};

const WATCH_HELP: &str = "Commands: c = claim, d = disconnect, r = reconnect, q = quit";
const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

/// Connect when a key is configured and auto-connect is on.
pub async fn auto_connect(controller: &FaucetController) {
    if !controller.config().wallet.auto_connect || controller.config().wallet.key_file.is_none() {
        return;
    }
    if let Err(e) = controller.connect().await {
        warn!(error = %e, "Auto-connect failed, continuing without a wallet");
    }
}

pub async fn status(controller: &FaucetController) -> Result<()> {
    let report = controller.refresh().await;
    if report.failures() > 0 {
        warn!(failures = report.failures(), "Some queries failed, showing last known values");
    }
    println!("{}", controller.view().await);
    Ok(())
}

pub async fn claim(controller: &FaucetController) -> Result<()> {
    controller.connect().await.context("Failed to connect wallet")?;
    controller.refresh().await;

    let attempt = controller.claim().await.context("Claim not submitted")?;
    println!("{}", controller.view().await);

    match attempt {
        ClaimAttempt::Succeeded(hash) => {
            info!(hash = %hash, "Claim succeeded");
            Ok(())
        }
        ClaimAttempt::Failed(message) => bail!("Claim failed: {}", message),
        other => bail!("Claim did not settle: {:?}", other),
    }
}

pub async fn watch(controller: Arc<FaucetController>) -> Result<()> {
    let mounted = controller.mount();
    println!("Wallet: {}", controller.wallet_name());
    println!("{}", WATCH_HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut redraw = interval(REDRAW_INTERVAL);
    redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last: Option<FaucetView> = None;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, shutting down");
                break;
            }
            line = lines.next_line(), if stdin_open => {
                match line.context("Failed to read stdin")? {
                    Some(command) => {
                        if !handle_command(&controller, command.trim()).await {
                            break;
                        }
                    }
                    None => stdin_open = false,
                }
            }
            _ = redraw.tick() => {
                let view = controller.view().await;
                if last.as_ref() != Some(&view) {
                    println!("\n{}\n", view);
                    last = Some(view);
                }
            }
        }
    }

    mounted.unmount().await;
    Ok(())
}

/// Returns `false` when the user asked to quit.
async fn handle_command(controller: &Arc<FaucetController>, command: &str) -> bool {
    match command {
        "c" => {
            // Claims run in the background so the view keeps updating
            let controller = controller.clone();
            tokio::spawn(async move {
                if let Err(e) = controller.claim().await {
                    println!("{}", e);
                }
            });
        }
        "d" => {
            if let Err(e) = controller.disconnect().await {
                warn!(error = %e, "Disconnect failed");
            }
        }
        "r" => {
            if let Err(e) = controller.connect().await {
                println!("Connect failed: {}", e);
            }
        }
        "q" => return false,
        "" => {}
        other => println!("Unknown command {:?}. {}", other, WATCH_HELP),
    }
    true
}
