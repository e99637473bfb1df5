use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::{fs, path::PathBuf, process::Command};
use tempfile::tempdir;

pub fn path_to_test_resource(name: &'static str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("resources");
    path.push("test");
    path.push(name);
    path
}

#[test]
fn generate_when_switch_model_then_sketch_on_stdout() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("arduinoml")?;

    cmd.arg("-o").arg("-").arg(path_to_test_resource("switch.json"));
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with(
            "// Wiring code generated from an ArduinoML model\n// Application name: Switch\n",
        ))
        .stdout(predicate::str::contains("\tpinMode(2, INPUT); // button [DigitalSensor]\n"))
        .stdout(predicate::str::contains("enum STATE {off, on};\n"));

    Ok(())
}

#[test]
fn generate_when_stdin_model_then_ok() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = assert_cmd::Command::cargo_bin("arduinoml")?;

    cmd.arg("-o")
        .arg("-")
        .arg("-")
        .write_stdin(fs::read_to_string(path_to_test_resource("switch.json"))?);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("STATE currentState = off;\n"));

    Ok(())
}

#[test]
fn generate_when_multi_model_then_scheduled_machines() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("greenhouse.ino");
    let mut cmd = Command::cargo_bin("arduinoml")?;

    cmd.arg("-o").arg(&output).arg(path_to_test_resource("multi.json"));
    cmd.assert().success().stdout(predicate::str::is_empty());

    let sketch = fs::read_to_string(&output)?;
    assert!(sketch.contains("//   fan (DigitalActuator): Pin D8\n"));
    assert!(sketch.contains("//   alarm (Buzzer): Pin D6\n"));
    assert!(sketch.contains("\tif (currentMillis - lastRun_climate >= 100) {\n"));
    assert!(sketch.contains("\tif (currentMillis - lastRun_siren >= 250) {\n"));
    assert!(sketch.contains("if ((serialInput == \"alarm\" || readTemperature(A0) >= 35)) {\n"));
    assert!(sketch.contains("tone(6, 880, 200);\n"));
    assert!(sketch.contains("lcd.print(readTemperature(A0));\n"));
    assert!(sketch.contains("Serial.begin(115200); // console [SerialLine]\n"));
    assert!(sketch.contains("Serial.println(\"ALARM\");\n"));
    assert!(sketch.contains("noTone(6);\n"));
    assert!(sketch.contains("lcd.clear();\n"));

    Ok(())
}

#[test]
fn generate_when_board_and_debounce_then_applied() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("arduinoml")?;

    cmd.arg("-b")
        .arg("MEGA")
        .arg("-d")
        .arg("75")
        .arg("-o")
        .arg("-")
        .arg(path_to_test_resource("switch.json"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("const unsigned long debounce = 75;\n"));

    Ok(())
}

#[test]
fn generate_when_invalid_model_then_reports_all_and_writes_nothing(
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("broken.ino");
    let mut cmd = Command::cargo_bin("arduinoml")?;

    cmd.arg("-o").arg(&output).arg(path_to_test_resource("invalid.json"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Model error"))
        .stderr(predicate::str::contains("Build failed with 3 errors"));

    assert!(!output.exists());

    Ok(())
}

#[test]
fn generate_when_not_a_file_then_err() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("arduinoml")?;

    cmd.arg("-vvvv").arg("-o").arg("-").arg("test/file/doesnt/exist");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open model"));

    Ok(())
}

#[test]
fn generate_when_unknown_board_then_err() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("arduinoml")?;

    cmd.arg("-b")
        .arg("leonardo")
        .arg("-o")
        .arg("-")
        .arg(path_to_test_resource("switch.json"));
    cmd.assert().failure();

    Ok(())
}
