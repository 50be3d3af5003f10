mod test_support;

use serde_json::{json, Value};
use test_support::{
    new_id, principal, request, request_err, request_ok, seed_school, select_workspace,
    spawn_sidecar, temp_dir,
};

#[test]
fn health_works_before_any_workspace() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let health = request_ok(&mut stdin, &mut reader, "health", json!({}), &Value::Null);
    assert!(health.get("version").and_then(|v| v.as_str()).is_some());
    assert!(health["workspacePath"].is_null());

    let anyone = principal(&new_id(), &new_id(), "TEACHER");
    let (code, status) = request_err(
        &mut stdin,
        &mut reader,
        "valuations.get",
        json!({ "valuationId": new_id() }),
        &anyone,
    );
    assert_eq!(code, "no_workspace");
    assert_eq!(status, Some(409));
}

#[test]
fn unknown_methods_are_not_implemented() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let resp = request(&mut stdin, &mut reader, "grades.explode", json!({}), &Value::Null);
    assert_eq!(resp["ok"], false);
    assert_eq!(resp["error"]["code"], "not_implemented");
}

#[test]
fn principal_and_role_gate_every_tenant_method() {
    let workspace = temp_dir("quartz-router-auth");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);
    let school = seed_school(&mut stdin, &mut reader);

    let (code, status) = request_err(
        &mut stdin,
        &mut reader,
        "templates.list",
        json!({}),
        &Value::Null,
    );
    assert_eq!((code.as_str(), status), ("unauthorized", Some(401)));

    let (code, status) = request_err(
        &mut stdin,
        &mut reader,
        "valuations.listByStudent",
        json!({ "studentId": school.student_id }),
        &school.student(),
    );
    assert_eq!((code.as_str(), status), ("forbidden", Some(403)));

    // Teachers read the registry but cannot edit it.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "learnings.list",
        json!({}),
        &school.teacher(),
    );
    let (code, _) = request_err(
        &mut stdin,
        &mut reader,
        "learnings.create",
        json!({
            "subjectId": school.math_id,
            "periodId": school.period_id,
            "description": "x",
            "grade": "1A"
        }),
        &school.teacher(),
    );
    assert_eq!(code, "forbidden");

    let malformed = json!({ "userId": school.teacher_id, "role": "TEACHER" });
    let (code, _) = request_err(&mut stdin, &mut reader, "session.get", json!({}), &malformed);
    assert_eq!(code, "unauthorized");
}

#[test]
fn malformed_ids_are_rejected_at_the_boundary() {
    let workspace = temp_dir("quartz-router-ids");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);
    let school = seed_school(&mut stdin, &mut reader);

    let (code, status) = request_err(
        &mut stdin,
        &mut reader,
        "valuations.initialize",
        json!({ "studentId": "student-1", "periodId": school.period_id }),
        &school.teacher(),
    );
    assert_eq!((code.as_str(), status), ("bad_params", Some(400)));

    let (code, _) = request_err(
        &mut stdin,
        &mut reader,
        "templates.get",
        json!({}),
        &school.teacher(),
    );
    assert_eq!(code, "bad_params");
}

#[test]
fn session_snapshot_lists_directory_and_templates() {
    let workspace = temp_dir("quartz-router-session");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);
    let school = seed_school(&mut stdin, &mut reader);
    let _ = test_support::seed_math_art(&mut stdin, &mut reader, &school);
    let template = request_ok(
        &mut stdin,
        &mut reader,
        "templates.create",
        json!({ "name": "Pauta semestral", "periodId": school.period_id }),
        &school.teacher(),
    );

    let session = request_ok(
        &mut stdin,
        &mut reader,
        "session.get",
        json!({}),
        &school.teacher(),
    );
    assert_eq!(session["user"]["id"], school.teacher_id.as_str());
    assert_eq!(session["user"]["role"], "TEACHER");
    let periods = session["periods"].as_array().expect("periods");
    assert_eq!(periods.len(), 1);
    assert_eq!(periods[0]["isActive"], true);
    assert_eq!(session["subjects"].as_array().map(|a| a.len()), Some(2));
    let templates = session["checklistTemplates"].as_array().expect("templates");
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0]["id"], template["id"]);
    assert_eq!(templates[0]["periodId"], school.period_id.as_str());

    // The lead has no templates of their own.
    let lead_session = request_ok(
        &mut stdin,
        &mut reader,
        "session.get",
        json!({}),
        &school.lead(),
    );
    assert_eq!(
        lead_session["checklistTemplates"].as_array().map(|a| a.len()),
        Some(0)
    );
}
