use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE_NAME: &str = "quartz.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    // Directory records. Maintained by directory.import; the core only reads them.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users(
            id TEXT PRIMARY KEY,
            institution_id TEXT NOT NULL,
            school_id TEXT,
            role TEXT NOT NULL,
            first_name TEXT NOT NULL,
            middle_name TEXT,
            last_name TEXT NOT NULL,
            second_last_name TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_users_institution ON users(institution_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS periods(
            id TEXT PRIMARY KEY,
            institution_id TEXT NOT NULL,
            name TEXT NOT NULL,
            start_date TEXT,
            end_date TEXT,
            is_active INTEGER NOT NULL DEFAULT 1
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_periods_institution ON periods(institution_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS subjects(
            id TEXT PRIMARY KEY,
            institution_id TEXT NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL DEFAULT 'SUBJECT'
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_subjects_institution ON subjects(institution_id)",
        [],
    )?;

    // No FOREIGN KEY on subject_id/period_id: directory deletions must not cascade.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS expected_learnings(
            id TEXT PRIMARY KEY,
            institution_id TEXT NOT NULL,
            subject_id TEXT NOT NULL,
            period_id TEXT NOT NULL,
            description TEXT NOT NULL,
            grade TEXT NOT NULL,
            created_by TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expected_learnings_period
         ON expected_learnings(institution_id, period_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS checklist_templates(
            id TEXT PRIMARY KEY,
            institution_id TEXT NOT NULL,
            period_id TEXT NOT NULL,
            teacher_id TEXT NOT NULL,
            name TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    ensure_checklist_templates_name(&conn)?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_checklist_templates_teacher_period
         ON checklist_templates(teacher_id, period_id, institution_id)",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS checklist_template_learnings(
            template_id TEXT NOT NULL,
            subject_id TEXT NOT NULL,
            subject_order INTEGER NOT NULL,
            learning_id TEXT NOT NULL,
            learning_order INTEGER NOT NULL,
            PRIMARY KEY(template_id, subject_order, learning_order),
            FOREIGN KEY(template_id) REFERENCES checklist_templates(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS student_valuations(
            id TEXT PRIMARY KEY,
            institution_id TEXT NOT NULL,
            student_id TEXT NOT NULL,
            teacher_id TEXT NOT NULL,
            checklist_template_id TEXT NOT NULL,
            period_id TEXT NOT NULL,
            global_status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(student_id, period_id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_student_valuations_institution
         ON student_valuations(institution_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_student_valuations_status
         ON student_valuations(global_status)",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS valuation_subjects(
            valuation_id TEXT NOT NULL,
            subject_order INTEGER NOT NULL,
            subject_id TEXT NOT NULL,
            max_subject_score INTEGER NOT NULL,
            total_subject_score INTEGER NOT NULL DEFAULT 0,
            subject_percentage REAL NOT NULL DEFAULT 0,
            assigned_concept_id TEXT,
            PRIMARY KEY(valuation_id, subject_order),
            FOREIGN KEY(valuation_id) REFERENCES student_valuations(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS valuation_learnings(
            valuation_id TEXT NOT NULL,
            subject_order INTEGER NOT NULL,
            learning_order INTEGER NOT NULL,
            learning_id TEXT NOT NULL,
            qualitative_valuation TEXT,
            points_obtained INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY(valuation_id, subject_order, learning_order),
            FOREIGN KEY(valuation_id, subject_order)
                REFERENCES valuation_subjects(valuation_id, subject_order)
        )",
        [],
    )?;

    migrate_global_status_names(&conn)?;

    Ok(conn)
}

fn ensure_checklist_templates_name(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "checklist_templates", "name")? {
        return Ok(());
    }
    conn.execute(
        "ALTER TABLE checklist_templates ADD COLUMN name TEXT NOT NULL DEFAULT ''",
        [],
    )?;
    Ok(())
}

fn migrate_global_status_names(conn: &Connection) -> anyhow::Result<()> {
    // Early workspaces stored the initial state as "CREATED".
    conn.execute(
        "UPDATE student_valuations SET global_status = 'NOT_STARTED' WHERE global_status = 'CREATED'",
        [],
    )?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
