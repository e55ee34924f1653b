//! End-to-end tests for the `convert` command
//!
//! These tests invoke the actual CLI binary and validate its behavior
//! from a user's perspective.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

const SIMPLE_JOB_XML: &str = "<project>\n  <description>demo job</description>\n</project>\n";

/// Test that --help flag shows help information
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_convert_help() {
    let mut cmd = cargo_bin_cmd!("job-wrecker");

    cmd.arg("convert")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Convert a job definition file or a directory of jobs",
        ));
}

/// Test that a missing input path produces an error
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_convert_missing_input() {
    let mut cmd = cargo_bin_cmd!("job-wrecker");

    cmd.arg("convert")
        .arg("--file")
        .arg("/nonexistent/config.xml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No such file or directory"));
}

/// Test converting a single file to stdout
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_convert_single_file_to_stdout() {
    let temp = assert_fs::TempDir::new().unwrap();
    let job_file = temp.child("demo.xml");
    job_file.write_str(SIMPLE_JOB_XML).unwrap();

    let mut cmd = cargo_bin_cmd!("job-wrecker");

    cmd.arg("convert")
        .arg("--file")
        .arg(job_file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("- job:\n    name: demo\n"))
        .stdout(predicate::str::contains("description: demo job"));
}

/// Test that --name overrides the derived job name
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_convert_name_override() {
    let temp = assert_fs::TempDir::new().unwrap();
    let job_file = temp.child("demo.xml");
    job_file.write_str(SIMPLE_JOB_XML).unwrap();

    let mut cmd = cargo_bin_cmd!("job-wrecker");

    cmd.arg("convert")
        .arg("--file")
        .arg(job_file.path())
        .arg("--name")
        .arg("renamed")
        .assert()
        .success()
        .stdout(predicate::str::contains("name: renamed"));
}

/// Test directory mode: every config.xml becomes a .yml named after its
/// directory
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_convert_directory() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("jobs/alpha/config.xml")
        .write_str(SIMPLE_JOB_XML)
        .unwrap();
    temp.child("jobs/beta/config.xml")
        .write_str(SIMPLE_JOB_XML)
        .unwrap();
    let output = temp.child("out");

    let mut cmd = cargo_bin_cmd!("job-wrecker");

    cmd.arg("convert")
        .arg("--file")
        .arg(temp.child("jobs").path())
        .arg("--output")
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 job(s), 0 failure(s)"));

    output
        .child("alpha.yml")
        .assert(predicate::str::contains("name: alpha"));
    output
        .child("beta.yml")
        .assert(predicate::str::contains("name: beta"));
}

/// Test that a directory without any config.xml is an error
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_convert_empty_directory() {
    let temp = assert_fs::TempDir::new().unwrap();

    let mut cmd = cargo_bin_cmd!("job-wrecker");

    cmd.arg("convert")
        .arg("--file")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No config.xml files found"));
}

/// Test that a job with an unrecognized top-level setting is reported as a
/// failure without stopping the other jobs
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_convert_directory_reports_failures() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("jobs/good/config.xml")
        .write_str(SIMPLE_JOB_XML)
        .unwrap();
    temp.child("jobs/bad/config.xml")
        .write_str("<project><somePluginBlob/></project>")
        .unwrap();
    let output = temp.child("out");

    let mut cmd = cargo_bin_cmd!("job-wrecker");

    cmd.arg("convert")
        .arg("--file")
        .arg(temp.child("jobs").path())
        .arg("--output")
        .arg(output.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("1 job(s), 1 failure(s)"))
        .stderr(predicate::str::contains("somePluginBlob"));

    output
        .child("good.yml")
        .assert(predicate::str::contains("name: good"));
}
