//! Integration tests for uploads, label mapping, dataset statistics and reports.

mod common;

use chrono::NaiveDate;
use diacare_classifiers::config::DisplayCalibration;
use diacare_classifiers::data_handling::{Feature, FeatureVector, Measurements, FEATURES};
use diacare_classifiers::diagnosis::{map_label, Diagnosis};
use diacare_classifiers::io::{read_dataset, read_parameter_csv, read_parameter_file};
use diacare_classifiers::report::{DiagnosisReport, ReportOutcome};
use diacare_classifiers::stats::{column_values, DatasetSummary};
use diacare_classifiers::DiagnosisError;

const UPLOAD: &str = "Parameter,Value
HbA1c Level,6.8
Glucose,190
BloodPressure,80
SkinThickness,25
Insulin,100
BMI,31.2
Genetic Correlation,0.45
Pregnancies,
Age,52
";

// ---------------------------------------------------------------------------
// Label mapping
// ---------------------------------------------------------------------------

#[test]
fn every_class_code_maps_to_a_label() {
    let expected = [
        (0, 0.0, "free from diabetes"),
        (1, 0.0, "high risk of diabetes type 1"),
        (2, 0.0, "high risk of diabetes type 2"),
        (3, 2.0, "high risk of gestational diabetes"),
        (3, 0.0, "free from diabetes"),
        (4, 0.0, "prediabetic"),
        (5, 0.0, "Monogenic/LADA/type 3c diabetes"),
        (6, 0.0, "free from diabetes"),
        (-1, 0.0, "free from diabetes"),
    ];
    for (code, pregnancies, label) in expected {
        assert_eq!(map_label(code, pregnancies).label(), label, "class code {}", code);
    }
}

#[test]
fn only_no_diabetes_is_not_at_risk() {
    assert!(!Diagnosis::NoDiabetes.is_at_risk());
    assert!(Diagnosis::Type2.is_at_risk());
    assert!(Diagnosis::Gestational.is_at_risk());
}

// ---------------------------------------------------------------------------
// FeatureVector / Measurements
// ---------------------------------------------------------------------------

#[test]
fn measurements_round_trip_through_feature_vector() {
    let measurements = Measurements {
        hba1c: 6.1,
        glucose: 140.0,
        blood_pressure: 72.0,
        skin_thickness: 30.0,
        insulin: 90.0,
        bmi: 28.4,
        pedigree: 0.5,
        pregnancies: 2.0,
        age: 41.0,
    };
    let features = measurements.to_feature_vector().unwrap();
    assert_eq!(features.get(Feature::Glucose), 140.0);
    assert_eq!(features.pregnancies(), 2.0);
    assert_eq!(features.to_measurements(), measurements);
}

#[test]
fn feature_vector_serialises_as_plain_list() {
    let features = FeatureVector::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]).unwrap();
    let json = serde_json::to_string(&features).unwrap();
    assert_eq!(json, "[1.0,2.0,3.0,4.0,5.0,6.0,7.0,8.0,9.0]");
    let back: FeatureVector = serde_json::from_str(&json).unwrap();
    assert_eq!(back, features);
    assert!(serde_json::from_str::<FeatureVector>("[1.0,2.0]").is_err());
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

#[test]
fn upload_builds_feature_vector_in_feature_order() {
    let upload = read_parameter_csv(UPLOAD.as_bytes()).unwrap();
    assert_eq!(upload.parameters.len(), 9);
    assert_eq!(upload.parameters[0], ("HbA1c Level".to_string(), "6.8".to_string()));
    assert_eq!(
        upload.features.as_slice(),
        &[6.8, 190.0, 80.0, 25.0, 100.0, 31.2, 0.45, 0.0, 52.0]
    );
}

#[test]
fn upload_with_missing_parameters_lists_them() {
    let csv = "Parameter,Value\nGlucose,120\nAge,30\n";
    match read_parameter_csv(csv.as_bytes()) {
        Err(DiagnosisError::InvalidUpload(msg)) => {
            assert!(msg.contains("HbA1c Level"));
            assert!(msg.contains("Genetic Correlation"));
            assert!(!msg.contains("Age"));
        }
        other => panic!("expected InvalidUpload, got {:?}", other),
    }
}

#[test]
fn upload_parameter_names_must_match_exactly() {
    let spaced = UPLOAD
        .replace("BloodPressure,", "Blood Pressure,")
        .replace("SkinThickness,", "Skin Thickness,");
    match read_parameter_csv(spaced.as_bytes()) {
        Err(DiagnosisError::InvalidUpload(msg)) => {
            assert!(msg.contains("BloodPressure"));
            assert!(msg.contains("SkinThickness"));
            assert!(!msg.contains("Glucose"));
        }
        other => panic!("expected InvalidUpload, got {:?}", other),
    }
}

#[test]
fn upload_with_single_column_is_rejected() {
    let csv = "Parameter\nGlucose\n";
    assert!(matches!(
        read_parameter_csv(csv.as_bytes()),
        Err(DiagnosisError::InvalidUpload(_))
    ));
}

#[test]
fn upload_file_is_read_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_temp_csv(&dir, "patient.csv", UPLOAD);
    let upload = read_parameter_file(&path).unwrap();
    assert_eq!(upload.features.get(Feature::Age), 52.0);
    assert!(matches!(
        read_parameter_file(dir.path().join("missing.csv")),
        Err(DiagnosisError::InvalidUpload(_))
    ));
}

// ---------------------------------------------------------------------------
// Dataset statistics
// ---------------------------------------------------------------------------

#[test]
fn summary_covers_features_and_outcome() {
    let dataset = read_dataset(common::separable_csv().as_bytes()).unwrap();
    let summary = DatasetSummary::from_dataset(&dataset);
    assert_eq!(summary.n_rows, 100);
    assert_eq!(summary.columns.len(), FEATURES.len() + 1);
    assert_eq!(summary.class_distribution, vec![(0, 50), (2, 50)]);

    let glucose = summary.column("Glucose").unwrap();
    assert_eq!(glucose.count, 100);
    assert_eq!(glucose.min, 90.0);
    assert_eq!(glucose.max, 200.0);
    assert!((glucose.mean - 145.0).abs() < 1e-9);
    assert_eq!(summary.range(Feature::Glucose), Some((90.0, 200.0)));
}

#[test]
fn out_of_range_flags_unseen_values() {
    let dataset = read_dataset(common::separable_csv().as_bytes()).unwrap();
    let summary = DatasetSummary::from_dataset(&dataset);
    let features =
        FeatureVector::new(&[6.0, 250.0, 70.0, 20.0, 80.0, 22.0, 0.3, 0.0, 25.0]).unwrap();
    assert_eq!(summary.out_of_range(&features), vec![Feature::Glucose]);
}

#[test]
fn column_values_by_header_name() {
    let dataset = read_dataset(common::separable_csv().as_bytes()).unwrap();
    assert_eq!(column_values(&dataset, "Outcome").unwrap().len(), 100);
    assert_eq!(column_values(&dataset, "Age").unwrap()[0], 25.0);
    assert!(column_values(&dataset, "Cholesterol").is_none());
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

fn sample_report() -> DiagnosisReport {
    let generated_at = NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap();
    let features = read_parameter_csv(UPLOAD.as_bytes()).unwrap().features;
    DiagnosisReport::new("Jane Doe", features, generated_at).unwrap()
}

#[test]
fn report_requires_a_name() {
    let features = read_parameter_csv(UPLOAD.as_bytes()).unwrap().features;
    let generated_at = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert!(matches!(
        DiagnosisReport::new("   ", features, generated_at),
        Err(DiagnosisError::Report(_))
    ));
}

#[test]
fn report_csv_lists_measurements() {
    let report = sample_report();
    let csv = report.to_csv().unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Feature,Value"));
    assert_eq!(lines.next(), Some("HbA1c Level,6.8"));
    assert!(csv.contains("Genetic Correlation,0.45"));
    assert_eq!(csv.lines().count(), 10);
    assert_eq!(report.csv_file_name(), "Jane_Doe_diabetes_data.csv");
}

#[test]
fn report_html_includes_prediction_when_present() {
    let calibration = DisplayCalibration::default();
    let report = sample_report().with_outcome(ReportOutcome {
        diagnosis: Diagnosis::Type2,
        accuracy_percent: calibration.percent(0.75),
    });
    let html = report.to_html(Some(&[(0, 50), (2, 50)]));
    assert!(html.contains("Diabetes Risk Assessment Report"));
    assert!(html.contains("User Name: Jane Doe"));
    assert!(html.contains("Date: 2024-03-05 14:30:00"));
    assert!(html.contains("The person has a high risk of diabetes type 2"));
    assert!(html.contains("The model used has an accuracy of 93.00%"));
    assert!(html.contains("class-distribution"));
    assert_eq!(report.html_file_name(), "Jane_Doe_diabetes_report.html");
}

#[test]
fn report_html_without_prediction_omits_result() {
    let html = sample_report().to_html(None);
    assert!(!html.contains("Prediction Result"));
    assert!(html.contains("HbA1c Level"));
}
