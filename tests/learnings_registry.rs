mod test_support;

use serde_json::json;
use test_support::{
    add_learning, new_id, request_err, request_ok, seed_school, select_workspace, spawn_sidecar,
    temp_dir,
};

#[test]
fn create_validates_references_and_fields() {
    let workspace = temp_dir("quartz-learnings-create");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);
    let school = seed_school(&mut stdin, &mut reader);
    let other = seed_school(&mut stdin, &mut reader);

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "learnings.create",
        json!({
            "subjectId": school.math_id,
            "periodId": school.period_id,
            "description": "  Multiplica por 2  ",
            "grade": "3B"
        }),
        &school.lead(),
    );
    assert_eq!(created["description"], "Multiplica por 2");
    assert_eq!(created["institutionId"], school.institution_id.as_str());
    assert_eq!(created["createdBy"], school.lead_id.as_str());

    // Subject belongs to a different institution.
    let (code, status) = request_err(
        &mut stdin,
        &mut reader,
        "learnings.create",
        json!({
            "subjectId": other.math_id,
            "periodId": school.period_id,
            "description": "x",
            "grade": "3B"
        }),
        &school.lead(),
    );
    assert_eq!((code.as_str(), status), ("not_found", Some(404)));

    let (code, _) = request_err(
        &mut stdin,
        &mut reader,
        "learnings.create",
        json!({
            "subjectId": school.math_id,
            "periodId": new_id(),
            "description": "x",
            "grade": "3B"
        }),
        &school.lead(),
    );
    assert_eq!(code, "not_found");

    let (code, status) = request_err(
        &mut stdin,
        &mut reader,
        "learnings.create",
        json!({
            "subjectId": school.math_id,
            "periodId": school.period_id,
            "description": " ",
            "grade": "3B"
        }),
        &school.lead(),
    );
    assert_eq!((code.as_str(), status), ("bad_params", Some(400)));
}

#[test]
fn list_filters_and_names_references() {
    let workspace = temp_dir("quartz-learnings-list");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);
    let school = seed_school(&mut stdin, &mut reader);
    let other = seed_school(&mut stdin, &mut reader);
    let m1 = add_learning(&mut stdin, &mut reader, &school, &school.math_id, "Suma");
    let _a1 = add_learning(&mut stdin, &mut reader, &school, &school.art_id, "Color");
    let _ = add_learning(&mut stdin, &mut reader, &other, &other.math_id, "Ajena");

    let all = request_ok(
        &mut stdin,
        &mut reader,
        "learnings.list",
        json!({ "periodId": school.period_id }),
        &school.teacher(),
    );
    let rows = all["learnings"].as_array().expect("learnings");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], m1.as_str());
    assert_eq!(rows[0]["subjectName"], "Matematica");
    assert_eq!(rows[0]["periodName"], "Primer semestre");

    let math_only = request_ok(
        &mut stdin,
        &mut reader,
        "learnings.list",
        json!({ "subjectId": school.math_id }),
        &school.student(),
    );
    assert_eq!(math_only["learnings"].as_array().map(|a| a.len()), Some(1));
}

#[test]
fn update_is_partial_and_delete_is_hard() {
    let workspace = temp_dir("quartz-learnings-update");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);
    let school = seed_school(&mut stdin, &mut reader);
    let other = seed_school(&mut stdin, &mut reader);
    let m1 = add_learning(&mut stdin, &mut reader, &school, &school.math_id, "Suma");

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "learnings.update",
        json!({ "learningId": m1, "patch": { "description": "Suma con reserva" } }),
        &school.lead(),
    );
    assert_eq!(updated["description"], "Suma con reserva");
    assert_eq!(updated["grade"], "3B");
    assert_eq!(updated["subjectId"], school.math_id.as_str());

    let moved = request_ok(
        &mut stdin,
        &mut reader,
        "learnings.update",
        json!({ "learningId": m1, "patch": { "subjectId": school.art_id } }),
        &school.lead(),
    );
    assert_eq!(moved["subjectId"], school.art_id.as_str());

    let (code, _) = request_err(
        &mut stdin,
        &mut reader,
        "learnings.update",
        json!({ "learningId": m1, "patch": { "subjectId": other.art_id } }),
        &school.lead(),
    );
    assert_eq!(code, "not_found");

    for patch in [json!({ "subjectId": "art" }), json!({ "periodId": "2026-S1" })] {
        let (code, status) = request_err(
            &mut stdin,
            &mut reader,
            "learnings.update",
            json!({ "learningId": m1, "patch": patch }),
            &school.lead(),
        );
        assert_eq!((code.as_str(), status), ("bad_params", Some(400)));
    }

    let (code, _) = request_err(
        &mut stdin,
        &mut reader,
        "learnings.delete",
        json!({ "learningId": m1 }),
        &other.lead(),
    );
    assert_eq!(code, "not_found");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "learnings.delete",
        json!({ "learningId": m1 }),
        &school.lead(),
    );
    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "learnings.list",
        json!({}),
        &school.lead(),
    );
    assert_eq!(listed["learnings"].as_array().map(|a| a.len()), Some(0));
}
