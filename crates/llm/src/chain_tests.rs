use super::*;
use crate::fake::FakeProvider;
use crate::provider::{ProviderKind, RequestKind};
use leon_core::conversation::{ConversationLog, Role};

fn log_with(turns: &[(Role, &str)]) -> ConversationLog {
    let mut log = ConversationLog::default();
    for (role, text) in turns {
        log.push(*role, *text, 0);
    }
    log
}

#[tokio::test]
async fn first_supporting_provider_that_succeeds_wins() {
    let primary = FakeProvider::new(ProviderKind::PrimaryCloud, vec![RequestKind::Chat]);
    primary.queue_response("hello from primary");
    let chain = ProviderChain::new(vec![primary.clone()]);

    let response = chain
        .complete(CompletionRequest::new(RequestKind::Chat, "hi"), &log_with(&[]))
        .await
        .expect("completes");
    assert_eq!(response.text, "hello from primary");
    assert_eq!(primary.call_count(), 1);
}

#[tokio::test]
async fn retryable_failure_falls_over_to_next_provider() {
    let primary = FakeProvider::new(ProviderKind::PrimaryCloud, vec![RequestKind::Chat]);
    primary.queue_error(ProviderError::Timeout);
    let secondary = FakeProvider::new(ProviderKind::SecondaryCloud, vec![RequestKind::Chat]);
    secondary.queue_response("hello from secondary");

    let chain = ProviderChain::new(vec![primary.clone(), secondary.clone()]);
    let response = chain
        .complete(CompletionRequest::new(RequestKind::Chat, "hi"), &log_with(&[]))
        .await
        .expect("completes");

    assert_eq!(response.text, "hello from secondary");
    assert_eq!(primary.call_count(), 1);
    assert_eq!(secondary.call_count(), 1);
}

#[tokio::test]
async fn non_retryable_failure_short_circuits_without_trying_next() {
    let primary = FakeProvider::new(ProviderKind::PrimaryCloud, vec![RequestKind::Chat]);
    primary.queue_error(ProviderError::Unauthorized);
    let secondary = FakeProvider::new(ProviderKind::SecondaryCloud, vec![RequestKind::Chat]);
    secondary.queue_response("should never be reached");

    let chain = ProviderChain::new(vec![primary, secondary.clone()]);
    let result = chain
        .complete(CompletionRequest::new(RequestKind::Chat, "hi"), &log_with(&[]))
        .await;

    assert!(matches!(result, Err(ChainError::NonRetryable(_))));
    assert_eq!(secondary.call_count(), 0);
}

#[tokio::test]
async fn no_supporting_provider_returns_unsupported() {
    let quick_only = FakeProvider::new(ProviderKind::PrimaryCloud, vec![RequestKind::Quick]);
    let chain = ProviderChain::new(vec![quick_only]);

    let result = chain
        .complete(CompletionRequest::new(RequestKind::Chat, "hi"), &log_with(&[]))
        .await;
    assert!(matches!(result, Err(ChainError::Unsupported(RequestKind::Chat))));
}

#[tokio::test]
async fn exhausting_every_provider_surfaces_last_error() {
    let primary = FakeProvider::new(ProviderKind::PrimaryCloud, vec![RequestKind::Chat]);
    primary.queue_error(ProviderError::Timeout);
    let secondary = FakeProvider::new(ProviderKind::SecondaryCloud, vec![RequestKind::Chat]);
    secondary.queue_error(ProviderError::RateLimited);

    let chain = ProviderChain::new(vec![primary, secondary]);
    let result = chain
        .complete(CompletionRequest::new(RequestKind::Chat, "hi"), &log_with(&[]))
        .await;
    assert!(matches!(result, Err(ChainError::Exhausted(_))));
}

#[tokio::test]
async fn long_conversation_is_truncated_to_provider_context_limit() {
    let narrow = FakeProvider::new_with_context_limit(ProviderKind::PrimaryCloud, vec![RequestKind::Chat], 20);
    narrow.queue_response("ack");
    let chain = ProviderChain::new(vec![narrow.clone()]);

    let log = log_with(&[
        (Role::User, "this is a long turn that will not fit"),
        (Role::Assistant, "neither will this one"),
        (Role::User, "short"),
    ]);
    chain
        .complete(CompletionRequest::new(RequestKind::Chat, "hi"), &log)
        .await
        .expect("completes");
}
