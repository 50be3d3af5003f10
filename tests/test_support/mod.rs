#![allow(dead_code)]

use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub type Stdout = BufReader<ChildStdout>;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

pub fn spawn_sidecar() -> (Child, ChildStdin, Stdout) {
    let exe = env!("CARGO_BIN_EXE_quartzd");
    let mut child = Command::new(exe)
        .env_remove("QUARTZD_WORKSPACE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn quartzd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn principal(user_id: &str, institution_id: &str, role: &str) -> Value {
    json!({ "userId": user_id, "institutionId": institution_id, "role": role })
}

/// Send one request and return the raw response envelope.
pub fn request(
    stdin: &mut ChildStdin,
    reader: &mut Stdout,
    method: &str,
    params: Value,
    principal: &Value,
) -> Value {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed).to_string();
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
        "principal": principal,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id.as_str()));
    value
}

pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut Stdout,
    method: &str,
    params: Value,
    principal: &Value,
) -> Value {
    let value = request(stdin, reader, method, params, principal);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

/// Expect a failure; returns `(code, details.status)`.
pub fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut Stdout,
    method: &str,
    params: Value,
    principal: &Value,
) -> (String, Option<u64>) {
    let value = request(stdin, reader, method, params, principal);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    let error = value.get("error").cloned().unwrap_or_default();
    let code = error
        .get("code")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();
    let status = error
        .get("details")
        .and_then(|d| d.get("status"))
        .and_then(|v| v.as_u64());
    (code, status)
}

pub fn select_workspace(stdin: &mut ChildStdin, reader: &mut Stdout, workspace: &Path) {
    let _ = request_ok(
        stdin,
        reader,
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
        &Value::Null,
    );
}

/// One institution with a lead, a teacher, a student, one period and the
/// subjects Math and Art.
#[derive(Debug, Clone)]
pub struct School {
    pub institution_id: String,
    pub lead_id: String,
    pub teacher_id: String,
    pub student_id: String,
    pub period_id: String,
    pub math_id: String,
    pub art_id: String,
}

impl School {
    pub fn lead(&self) -> Value {
        principal(&self.lead_id, &self.institution_id, "AREA_LEAD")
    }

    pub fn teacher(&self) -> Value {
        principal(&self.teacher_id, &self.institution_id, "TEACHER")
    }

    pub fn student(&self) -> Value {
        principal(&self.student_id, &self.institution_id, "STUDENT")
    }
}

pub fn seed_school(stdin: &mut ChildStdin, reader: &mut Stdout) -> School {
    let school = School {
        institution_id: new_id(),
        lead_id: new_id(),
        teacher_id: new_id(),
        student_id: new_id(),
        period_id: new_id(),
        math_id: new_id(),
        art_id: new_id(),
    };
    let summary = request_ok(
        stdin,
        reader,
        "directory.import",
        json!({
            "users": [
                { "id": school.lead_id, "role": "AREA_LEAD", "firstName": "Lucia", "lastName": "Rojas" },
                { "id": school.teacher_id, "role": "TEACHER", "firstName": "Tomas", "lastName": "Vera" },
                {
                    "id": school.student_id,
                    "role": "STUDENT",
                    "firstName": "Sofia",
                    "middleName": "Isabel",
                    "lastName": "Munoz",
                    "secondLastName": "Pinto"
                }
            ],
            "periods": [
                { "id": school.period_id, "name": "Primer semestre", "startDate": "2026-03-01", "endDate": "2026-07-15" }
            ],
            "subjects": [
                { "id": school.math_id, "name": "Matematica" },
                { "id": school.art_id, "name": "Artes" }
            ]
        }),
        &school.lead(),
    );
    assert_eq!(summary["users"], 3);
    school
}

pub fn add_learning(
    stdin: &mut ChildStdin,
    reader: &mut Stdout,
    school: &School,
    subject_id: &str,
    description: &str,
) -> String {
    let created = request_ok(
        stdin,
        reader,
        "learnings.create",
        json!({
            "subjectId": subject_id,
            "periodId": school.period_id,
            "description": description,
            "grade": "3B"
        }),
        &school.lead(),
    );
    created["id"].as_str().expect("learning id").to_string()
}

/// Math gets two learnings and Art one, in that insertion order.
pub fn seed_math_art(
    stdin: &mut ChildStdin,
    reader: &mut Stdout,
    school: &School,
) -> (String, String, String) {
    let m1 = add_learning(stdin, reader, school, &school.math_id, "Suma hasta 100");
    let m2 = add_learning(stdin, reader, school, &school.math_id, "Resta hasta 100");
    let a1 = add_learning(stdin, reader, school, &school.art_id, "Mezcla colores primarios");
    (m1, m2, a1)
}

pub fn subject<'a>(valuation: &'a Value, subject_id: &str) -> &'a Value {
    valuation["valuationsBySubject"]
        .as_array()
        .expect("valuationsBySubject")
        .iter()
        .find(|s| s["subjectId"] == subject_id)
        .expect("subject present")
}

/// Direct handle on the workspace database, for simulating upstream deletions.
pub fn open_store(workspace: &Path) -> rusqlite::Connection {
    rusqlite::Connection::open(workspace.join("quartz.sqlite3")).expect("open store")
}
