use super::*;

#[test]
fn tokenizes_quoted_arguments() {
    let tokens = tokenize_shell_command("git commit -m 'hello world'").expect("tokenize");
    assert_eq!(tokens, vec!["git", "commit", "-m", "hello world"]);
}

#[test]
fn rejects_semicolon_chaining() {
    let err = tokenize_shell_command("ls; rm -rf /").unwrap_err();
    assert!(matches!(err, SkillError::Metacharacter(_)));
}

#[test]
fn rejects_command_substitution() {
    let err = tokenize_shell_command("echo $(whoami)").unwrap_err();
    assert!(matches!(err, SkillError::Metacharacter(_)));
}

#[test]
fn rejects_unterminated_quote() {
    let err = tokenize_shell_command("echo 'unterminated").unwrap_err();
    assert!(matches!(err, SkillError::UnterminatedQuote));
}

#[test]
fn rejects_empty_command() {
    let err = tokenize_shell_command("   ").unwrap_err();
    assert!(matches!(err, SkillError::Empty));
}

#[test]
fn python_source_check_rejects_denied_identifiers() {
    assert!(check_python_source("import subprocess").is_err());
    assert!(check_python_source("eval('1')").is_err());
    assert!(check_python_source("print(1 + 1)").is_ok());
}

#[tokio::test]
async fn shell_exec_runs_allow_listed_program() {
    let out = shell_exec("echo hello", &["echo".to_string()]).await.expect("run");
    assert_eq!(out.trim(), "hello");
}

#[tokio::test]
async fn shell_exec_refuses_program_outside_allow_list() {
    let err = shell_exec("echo hello", &["git".to_string()]).await.unwrap_err();
    assert!(matches!(err, SkillError::NotAllowed(_)));
}
