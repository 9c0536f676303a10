#![allow(dead_code)]

use lms_plagiarism::Config;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const LONG_TEXT: &str =
    "Ownership in Rust means every value has exactly one owner, and the value is dropped when the owner goes out of scope.";

/// 课程目录：学生 alice 提交，讲师 dr_bob 接收通知
pub const CATALOG: &str = r#"
[[users]]
id = 1
username = "alice"
role = "student"

[[users]]
id = 2
username = "dr_bob"
role = "lecturer"

[[lecturers]]
id = 10
user_id = 2

[[courses]]
id = 100
title = "Rust"
lecturer_id = 10

[[modules]]
id = 200
course_id = 100
title = "Ownership"

[[lessons]]
id = 300
module_id = 200
title = "Moves"
lesson_type = "assignment"

[[assignments]]
id = 400
lesson_id = 300
title = "Essay"
"#;

/// 一次批处理运行所需的临时目录
pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
    pub submissions: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        let submissions = root.join("pending_submissions");
        fs::create_dir_all(&submissions).expect("create submissions folder");
        fs::write(root.join("lms_catalog.toml"), CATALOG).expect("write catalog");

        Self {
            _tmp: tmp,
            root,
            submissions,
        }
    }

    /// 指向临时目录和给定服务地址的配置
    pub fn config(&self, base_url: &str) -> Config {
        Config {
            plagiarism_api_base_url: base_url.to_string(),
            plagiarism_api_token: "test-token".to_string(),
            submissions_folder: path_string(&self.submissions),
            catalog_file: path_string(&self.root.join("lms_catalog.toml")),
            notification_log_file: path_string(&self.notifications_path()),
            output_log_file: path_string(&self.report_path()),
            max_concurrent_checks: 2,
            ..Config::default()
        }
    }

    pub fn write_submissions(&self, name: &str, submissions: &[(u64, u64, u64, &str)]) -> PathBuf {
        let mut content = String::new();
        for (id, assignment_id, student_id, text) in submissions {
            content.push_str(&format!(
                "[[submissions]]\nid = {}\nassignment_id = {}\nstudent_id = {}\nsubmission_text = {:?}\n\n",
                id, assignment_id, student_id, text
            ));
        }
        let path = self.submissions.join(name);
        fs::write(&path, content).expect("write submissions");
        path
    }

    pub fn notifications_path(&self) -> PathBuf {
        self.root.join("notifications.jsonl")
    }

    pub fn report_path(&self) -> PathBuf {
        self.root.join("plagiarism_report.txt")
    }

    pub fn read_notifications(&self) -> Vec<serde_json::Value> {
        let content = fs::read_to_string(self.notifications_path()).unwrap_or_default();
        content
            .lines()
            .map(|line| serde_json::from_str(line).expect("notification line is json"))
            .collect()
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
