use anyhow::bail;
use anyhow::Result;
use tokio::sync::mpsc;

use super::UiConfirmer;
use crate::domain::models::ConfirmPrompt;
use crate::domain::models::Confirmer;
use crate::domain::models::Event;
use crate::domain::models::SyncError;

async fn answer(rx: &mut mpsc::UnboundedReceiver<Event>, accept: Option<bool>) -> Result<()> {
    match rx.recv().await {
        Some(Event::ConfirmRequested(prompt, tx)) => {
            assert_eq!(prompt.title, "Restart assignment");
            if let Some(accept) = accept {
                let _ = tx.send(accept);
            }
        }
        _ => bail!("Expected a confirmation request"),
    }

    return Ok(());
}

#[tokio::test]
async fn it_resolves_on_accept() -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let confirmer = UiConfirmer::new(tx);

    let (res, answered) = tokio::join!(
        confirmer.confirm(ConfirmPrompt::restart("fizzbuzz")),
        answer(&mut rx, Some(true))
    );
    answered?;
    assert_eq!(res, Ok(()));

    return Ok(());
}

#[tokio::test]
async fn it_cancels_on_reject() -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let confirmer = UiConfirmer::new(tx);

    let (res, answered) = tokio::join!(
        confirmer.confirm(ConfirmPrompt::restart("fizzbuzz")),
        answer(&mut rx, Some(false))
    );
    answered?;
    assert_eq!(res, Err(SyncError::UserCancelled));

    return Ok(());
}

#[tokio::test]
async fn it_cancels_when_the_modal_is_dropped() -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let confirmer = UiConfirmer::new(tx);

    let (res, answered) = tokio::join!(
        confirmer.confirm(ConfirmPrompt::restart("fizzbuzz")),
        answer(&mut rx, None)
    );
    answered?;
    assert_eq!(res, Err(SyncError::UserCancelled));

    return Ok(());
}

#[tokio::test]
async fn it_cancels_without_a_ui() {
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    drop(rx);

    let res = UiConfirmer::new(tx)
        .confirm(ConfirmPrompt::restart("fizzbuzz"))
        .await;
    assert_eq!(res, Err(SyncError::UserCancelled));
}
