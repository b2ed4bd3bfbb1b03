//! Flash message TTL, dismissal, and stale-timer behavior under simulated
//! time.

use rollcall_client::flash::{FlashKind, FlashMessages};
use std::time::Duration;

async fn advance(ms: u64) {
	tokio::time::advance(Duration::from_millis(ms)).await;
	tokio::task::yield_now().await;
}

#[tokio::test(start_paused = true)]
async fn message_expires_by_its_ttl() {
	let flash = FlashMessages::new();
	flash.show(FlashKind::Success, "Welcome!");

	advance(2900).await;
	assert_eq!(flash.visible().len(), 1);

	// Contract: gone by 3100 ms, tolerating scheduling jitter.
	advance(200).await;
	assert!(flash.visible().is_empty());
}

#[tokio::test(start_paused = true)]
async fn dismiss_before_ttl_removes_immediately_and_cancels_the_timer() {
	let flash = FlashMessages::new();
	let id = flash.show(FlashKind::Success, "Welcome!");

	assert!(flash.dismiss(id));
	assert!(flash.visible().is_empty());

	// The cancelled timer must not fire against anything later.
	advance(5000).await;
	assert!(flash.visible().is_empty());
	assert!(!flash.dismiss(id));
}

#[tokio::test(start_paused = true)]
async fn replacement_restarts_the_clock_for_its_kind() {
	let flash = FlashMessages::new();
	flash.show(FlashKind::Success, "first");

	advance(1500).await;
	flash.show(FlashKind::Success, "second");

	// Where the first message would have expired, the replacement lives on.
	advance(1600).await;
	let visible = flash.visible();
	assert_eq!(visible.len(), 1);
	assert_eq!(visible[0].text, "second");

	advance(1500).await;
	assert!(flash.visible().is_empty());
}

#[tokio::test(start_paused = true)]
async fn a_dismissed_id_does_not_shadow_a_successor_of_the_same_kind() {
	let flash = FlashMessages::new();
	let first = flash.show(FlashKind::Danger, "first");
	flash.dismiss(first);

	let second = flash.show(FlashKind::Danger, "second");
	assert_ne!(first, second);

	advance(1000).await;
	assert_eq!(flash.visible_of(FlashKind::Danger).unwrap().text, "second");
}

#[tokio::test(start_paused = true)]
async fn kinds_expire_independently() {
	let flash = FlashMessages::new();
	flash.show(FlashKind::Danger, "User does not exist.");

	advance(2000).await;
	flash.show(FlashKind::Success, "Welcome!");

	// The danger message hits its TTL first.
	advance(1100).await;
	assert!(flash.visible_of(FlashKind::Danger).is_none());
	assert_eq!(flash.visible_of(FlashKind::Success).unwrap().text, "Welcome!");

	advance(2000).await;
	assert!(flash.visible().is_empty());
}

#[tokio::test(start_paused = true)]
async fn configured_ttl_is_respected() {
	let flash = FlashMessages::with_default_ttl(Duration::from_millis(1000));
	flash.show(FlashKind::Success, "quick");

	advance(900).await;
	assert_eq!(flash.visible().len(), 1);

	advance(200).await;
	assert!(flash.visible().is_empty());
}
