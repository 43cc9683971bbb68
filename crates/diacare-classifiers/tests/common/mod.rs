#![allow(dead_code)]

use std::fmt::Write;

pub const HEADER: &str =
    "HbA1c_level,Pregnancies,Glucose,BloodPressure,SkinThickness,Insulin,BMI,DiabetesPedigreeFunction,Age,Outcome";

/// 50 healthy rows plus 50 class-2 rows that differ only in glucose.
pub fn separable_csv() -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for _ in 0..50 {
        csv.push_str("6.0,0,90,70,20,80,22,0.3,25,0\n");
    }
    for _ in 0..50 {
        csv.push_str("6.0,0,200,70,20,80,22,0.3,25,2\n");
    }
    csv
}

/// Six outcome classes banded by glucose and HbA1c, with some pregnancy variation.
pub fn six_class_csv() -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for class in 0..6 {
        for i in 0..12 {
            let glucose = 80 + class * 40 + i;
            let hba1c = 4.5 + class as f64 * 0.8;
            let pregnancies = if class == 3 { 1 + i % 3 } else { i % 2 };
            writeln!(
                csv,
                "{:.1},{},{},{},{},{},{},{},{},{}",
                hba1c,
                pregnancies,
                glucose,
                60 + i,
                20,
                80 + class * 5,
                24.5,
                0.2 + class as f64 * 0.1,
                30 + i,
                class
            )
            .unwrap();
        }
    }
    csv
}

pub fn write_temp_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}
