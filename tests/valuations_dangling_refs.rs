mod test_support;

use serde_json::{json, Value};
use test_support::{
    open_store, request_err, request_ok, seed_math_art, seed_school, select_workspace,
    spawn_sidecar, subject, temp_dir,
};

#[test]
fn deleted_references_degrade_to_placeholders() {
    let workspace = temp_dir("quartz-dangling-placeholders");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);
    let school = seed_school(&mut stdin, &mut reader);
    let (m1, _m2, _a1) = seed_math_art(&mut stdin, &mut reader, &school);
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "templates.create",
        json!({ "name": "Pauta", "periodId": school.period_id }),
        &school.teacher(),
    );
    let v = request_ok(
        &mut stdin,
        &mut reader,
        "valuations.initialize",
        json!({ "studentId": school.student_id, "periodId": school.period_id }),
        &school.teacher(),
    );

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "learnings.delete",
        json!({ "learningId": m1 }),
        &school.lead(),
    );
    {
        let conn = open_store(&workspace);
        conn.execute("DELETE FROM periods WHERE id = ?", [&school.period_id])
            .expect("delete period");
        conn.execute("DELETE FROM subjects WHERE id = ?", [&school.art_id])
            .expect("delete subject");
    }

    let fetched = request_ok(
        &mut stdin,
        &mut reader,
        "valuations.get",
        json!({ "valuationId": v["id"] }),
        &school.teacher(),
    );
    assert_eq!(fetched["periodName"], "Periodo no disponible");
    assert_eq!(
        subject(&fetched, &school.art_id)["subjectName"],
        "Asignatura no disponible"
    );
    let math = subject(&fetched, &school.math_id);
    assert_eq!(math["subjectName"], "Matematica");
    let first: &Value = &math["learningValuations"][0];
    assert_eq!(first["learningId"], m1.as_str());
    assert_eq!(first["learningDescription"], "Aprendizaje eliminado");
    assert_eq!(
        math["learningValuations"][1]["learningDescription"],
        "Resta hasta 100"
    );

    // The deleted learning can still be marked; ids are kept on the valuation.
    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "valuations.update",
        json!({ "valuationId": v["id"], "valuationsBySubject": [
            { "subjectId": school.math_id, "learningValuations": [
                { "learningId": m1, "qualitativeValuation": "ACHIEVED" }
            ]}
        ]}),
        &school.teacher(),
    );
    assert_eq!(
        subject(&updated, &school.math_id)["learningValuations"][0]["qualitativeValuation"],
        "ACHIEVED"
    );

    // The existing valuation is still returned even though its period is gone.
    let again = request_ok(
        &mut stdin,
        &mut reader,
        "valuations.initialize",
        json!({ "studentId": school.student_id, "periodId": school.period_id }),
        &school.teacher(),
    );
    assert_eq!(again["id"], v["id"]);
}

#[test]
fn missing_student_is_an_integrity_error() {
    let workspace = temp_dir("quartz-dangling-student");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);
    let school = seed_school(&mut stdin, &mut reader);
    let _ = seed_math_art(&mut stdin, &mut reader, &school);
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "templates.create",
        json!({ "name": "Pauta", "periodId": school.period_id }),
        &school.teacher(),
    );
    let v = request_ok(
        &mut stdin,
        &mut reader,
        "valuations.initialize",
        json!({ "studentId": school.student_id, "periodId": school.period_id }),
        &school.teacher(),
    );

    {
        let conn = open_store(&workspace);
        conn.execute("DELETE FROM users WHERE id = ?", [&school.student_id])
            .expect("delete student");
    }

    let (code, status) = request_err(
        &mut stdin,
        &mut reader,
        "valuations.get",
        json!({ "valuationId": v["id"] }),
        &school.teacher(),
    );
    assert_eq!((code.as_str(), status), ("integrity_error", Some(500)));

    let (code, _) = request_err(
        &mut stdin,
        &mut reader,
        "valuations.listByStudent",
        json!({ "studentId": school.student_id }),
        &school.teacher(),
    );
    assert_eq!(code, "integrity_error");
}
