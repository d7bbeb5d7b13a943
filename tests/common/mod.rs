// Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use rust_sqlite_orm::{ConnectorConfig, Database, Instance, Result, Schema};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Helper function to create an in-memory database for testing
pub fn create_test_db() -> Result<Database> {
    init_tracing();
    Database::open(&ConnectorConfig::in_memory())
}

/// Small deterministic generator so runs are reproducible.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    pub fn range(&mut self, low: i64, high: i64) -> i64 {
        low + (self.next_u64() % (high - low + 1) as u64) as i64
    }

    pub fn unit(&mut self) -> f64 {
        (self.next_u64() % 1_000_000) as f64 / 1_000_000.0
    }
}

pub fn student_schema(db: &Database) -> Result<Arc<Schema>> {
    db.register(
        Schema::builder("Student")
            .integer("eid")
            .text("graduating_year")
            .text("name")
            .float("gpa")
            .boolean("is_graduating")
            .build()?,
    )
}

pub fn random_student(schema: &Arc<Schema>, rng: &mut Lcg) -> Result<Instance> {
    let eid = rng.range(0, 1000);
    let year = rng.range(2022, 2025);
    Instance::new(schema)
        .with("eid", eid)?
        .with("graduating_year", year.to_string())?
        .with("name", format!("John or Jane Doe #{}", eid))?
        .with("gpa", rng.unit() * 4.0)?
        .with("is_graduating", year == 2022)
}

pub fn coord_schema(db: &Database) -> Result<Arc<Schema>> {
    db.register(
        Schema::builder("Coord3D")
            .integer("x")
            .integer("y")
            .integer("z")
            .text("name")
            .build()?,
    )
}

pub fn coord(schema: &Arc<Schema>, name: &str, x: i64, y: i64, z: i64) -> Result<Instance> {
    Instance::new(schema)
        .with("name", name)?
        .with("x", x)?
        .with("y", y)?
        .with("z", z)
}

/// Course, Student, and EnrollmentRecord pointing at both.
pub fn enrollment_schemas(db: &Database) -> Result<(Arc<Schema>, Arc<Schema>, Arc<Schema>)> {
    let course = db.register(
        Schema::builder("Course")
            .text("dept")
            .text("name")
            .build()?,
    )?;
    let student = db.register(Schema::builder("Student").text("eid").build()?)?;
    let enrollment = db.register(
        Schema::builder("EnrollmentRecord")
            .reference("course", "Course")
            .reference("enrolled_student", "Student")
            .build()?,
    )?;
    Ok((course, student, enrollment))
}
