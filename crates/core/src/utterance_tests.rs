use super::*;

#[test]
fn builtin_dispatch_requires_scheduler_source() {
    let u = Utterance::new(UtteranceId::new("u-1"), 0, Source::Scheduler, "__builtin__:heartbeat");
    assert!(u.is_builtin_dispatch());
    assert_eq!(u.builtin_token(), Some("heartbeat"));

    let u2 = Utterance::new(UtteranceId::new("u-2"), 0, Source::Cli, "__builtin__:heartbeat");
    assert!(!u2.is_builtin_dispatch());
}

#[test]
fn scheduler_and_self_sources_skip_conversation_log() {
    assert!(Source::Scheduler.skips_conversation_log());
    assert!(Source::SelfGenerated.skips_conversation_log());
    assert!(!Source::Cli.skips_conversation_log());
    assert!(!Source::Dashboard.skips_conversation_log());
}
