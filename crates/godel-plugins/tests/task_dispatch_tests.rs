//! Integration tests for task dispatch
//!
//! Resolves a real (scripted) plugin end-to-end and checks the argv the
//! launcher hands to the plugin subprocess, both as composed argument lists
//! and by running the task and capturing what the plugin actually received.

#![cfg(unix)]

mod common;

use common::*;
use godel_core::locator::Locator;
use godel_plugins::{load_tasks, GlobalParams, Task};

async fn resolve_echo_plugin(env: &TestEnv) -> Vec<Task> {
    let resolver = env.resolver();
    let locator: Locator = "com.palantir:echoer:1.0.0".parse().unwrap();
    env.stage_plugin(&locator, resolver.os_arch(), &echo_plugin_info("echoer", "1.0.0"));

    let params = env.params_from_yaml(&format!(
        "plugins:\n  resolvers:\n    - \"{}\"\n  plugins:\n    - locator:\n        id: \"com.palantir:echoer:1.0.0\"\n",
        env.repo_template()
    ));

    let mut out: Vec<u8> = Vec::new();
    load_tasks(&resolver, &params, &mut out).await.unwrap()
}

fn expected_leading_args(project_dir: &std::path::Path) -> Vec<String> {
    let dir = project_dir.display();
    vec![
        "--project-dir".to_string(),
        format!("{}", dir),
        "--godel-config".to_string(),
        format!("{}/godel/config/godel.yml", dir),
        "--config".to_string(),
        format!("{}/godel/config/echo.yml", dir),
        "echo".to_string(),
    ]
}

#[tokio::test]
async fn test_dispatch_args() {
    let env = TestEnv::new();
    let tasks = resolve_echo_plugin(&env).await;
    let task = &tasks[0];

    let global = GlobalParams::new(env.project_dir());
    let user_args: Vec<String> = ["foo", "--bar", "baz"].iter().map(|s| s.to_string()).collect();

    let mut expected = expected_leading_args(&env.project_dir());
    expected.extend(user_args.iter().cloned());
    assert_eq!(task.args(&global, &user_args), expected);
}

#[tokio::test]
async fn test_verify_apply_true_args() {
    let env = TestEnv::new();
    let tasks = resolve_echo_plugin(&env).await;
    let task = &tasks[0];

    let global = GlobalParams::new(env.project_dir());
    assert_eq!(
        task.verify_args(&global, true),
        expected_leading_args(&env.project_dir())
    );
}

#[tokio::test]
async fn test_verify_apply_false_args() {
    let env = TestEnv::new();
    let tasks = resolve_echo_plugin(&env).await;
    let task = &tasks[0];

    let global = GlobalParams::new(env.project_dir());
    let mut expected = expected_leading_args(&env.project_dir());
    expected.push("--verify".to_string());
    assert_eq!(task.verify_args(&global, false), expected);
}

#[tokio::test]
async fn test_run_passes_composed_args_to_the_plugin() {
    let env = TestEnv::new();
    let resolver = env.resolver();
    let locator: Locator = "com.palantir:echoer:1.0.0".parse().unwrap();
    let info = echo_plugin_info("echoer", "1.0.0");

    // a plugin that records the argv it receives instead of echoing it
    let argv_file = env.project_dir().join("received-args");
    let script = format!(
        "#!/bin/sh\nif [ \"$1\" = \"{}\" ]; then\n    echo '{}'\n    exit 0\nfi\necho \"$@\" >> {}\n",
        godel_plugins::INFO_COMMAND_NAME,
        serde_json::to_string(&info).unwrap(),
        argv_file.display()
    );
    let archive_path =
        std::path::PathBuf::from(env.repo_url(&locator, resolver.os_arch()));
    std::fs::create_dir_all(archive_path.parent().unwrap()).unwrap();
    write_tgz_with_script(&archive_path, "echoer-1.0.0", &script);

    let params = env.params_from_yaml(&format!(
        "plugins:\n  resolvers:\n    - \"{}\"\n  plugins:\n    - locator:\n        id: \"com.palantir:echoer:1.0.0\"\n",
        env.repo_template()
    ));

    let mut out: Vec<u8> = Vec::new();
    let tasks = load_tasks(&resolver, &params, &mut out).await.unwrap();
    let task = &tasks[0];

    let global = GlobalParams::new(env.project_dir());
    let user_args: Vec<String> = ["foo", "--bar", "baz"].iter().map(|s| s.to_string()).collect();
    task.run(&global, &user_args).await.unwrap();

    let received = std::fs::read_to_string(&argv_file).unwrap();
    let project_dir = env.project_dir();
    let dir = project_dir.display();
    assert_eq!(
        received,
        format!(
            "--project-dir {dir} --godel-config {dir}/godel/config/godel.yml --config {dir}/godel/config/echo.yml echo foo --bar baz\n"
        )
    );
}
