/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;
use tokio_test;
use narravid::app_controller::Controller;
use narravid::app_config::{Config, SynthesisEngine};
use narravid::synthesis::mock::MockSynthesizer;
use crate::common;

/// Build a controller backed by the mock engine.
fn mock_controller() -> Controller {
    common::init_test_logging();

    let mut config = Config::default();
    config.synthesis.engine = SynthesisEngine::Mock;
    Controller::with_synthesizer(config, Box::new(MockSynthesizer::working()))
}

/// Test the controller initialization with default config
#[test]
fn test_controller_initialization_withDefaultConfig_shouldSucceed() -> Result<()> {
    // Create a controller with test configuration - should succeed without errors
    let _controller = Controller::new_for_test()?;

    Ok(())
}

/// Test the controller with custom configuration
#[test]
fn test_controller_withCustomConfig_shouldKeepSettings() -> Result<()> {
    let mut config = Config::default();
    config.synthesis.engine = SynthesisEngine::Mock;
    config.captions.font_size = 64;

    let controller = Controller::with_config(config)?;

    assert_eq!(controller.config().captions.font_size, 64);
    assert_eq!(controller.engine_name(), "mock");

    Ok(())
}

/// Test that the injected engine drives the reported engine name
#[test]
fn test_controller_withInjectedEngine_shouldReportEngineName() {
    let controller = mock_controller();
    assert_eq!(controller.engine_name(), "mock");
}

/// Test dry-run segmentation of a sample script
#[test]
fn test_listUnits_withSampleScript_shouldReturnExpectedUnits() -> Result<()> {
    let controller = mock_controller();

    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_test_script(&temp_dir.path().to_path_buf(), "walkthrough.txt")?;

    let units = controller.list_units(&script_path)?;
    let texts: Vec<&str> = units.iter().map(|u| u.text.as_str()).collect();

    assert_eq!(
        texts,
        vec![
            "Welcome to the walkthrough. It only takes a minute.",
            "- first checkpoint: the service is running.",
            "1. Open the dashboard",
            "The closing remark wraps everything up.",
        ]
    );

    Ok(())
}

/// Test that an empty script completes without producing a video
#[test]
fn test_run_withEmptyScript_shouldNotProduceOutput() -> Result<()> {
    let controller = mock_controller();

    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_test_file(&temp_dir.path().to_path_buf(), "empty.txt", "\n\n \n")?;
    let image_path = common::create_test_file(&temp_dir.path().to_path_buf(), "background.png", "png bytes")?;

    let result = tokio_test::block_on(controller.run(
        script_path,
        image_path,
        None,
        None,
        false,
    ));

    assert!(result.is_ok(), "An empty script is not an error");

    // No video next to the script
    let expected_output = temp_dir.path().join("empty.mp4");
    assert!(!expected_output.exists(), "empty script should not create output");

    Ok(())
}

/// Test that an existing output is skipped without the force flag
#[test]
fn test_run_withExistingOutput_shouldSkipRender() -> Result<()> {
    let controller = mock_controller();

    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_test_script(&temp_dir.path().to_path_buf(), "walkthrough.txt")?;
    let image_path = common::create_test_file(&temp_dir.path().to_path_buf(), "background.png", "png bytes")?;
    let output_path = common::create_test_file(&temp_dir.path().to_path_buf(), "walkthrough.mp4", "placeholder")?;

    let result = tokio_test::block_on(controller.run(
        script_path,
        image_path,
        None,
        None,
        false,
    ));

    assert!(result.is_ok(), "Skipping an existing output is not an error");

    // The placeholder was left untouched
    let content = std::fs::read_to_string(&output_path)?;
    assert_eq!(content, "placeholder");

    Ok(())
}

/// Test that a missing script file is rejected
#[test]
fn test_run_withMissingScript_shouldFail() -> Result<()> {
    let controller = mock_controller();

    let temp_dir = common::create_temp_dir()?;
    let image_path = common::create_test_file(&temp_dir.path().to_path_buf(), "background.png", "png bytes")?;

    let result = tokio_test::block_on(controller.run(
        temp_dir.path().join("does_not_exist.txt"),
        image_path,
        None,
        None,
        false,
    ));

    assert!(result.is_err());

    Ok(())
}

/// Test that a missing image file is rejected
#[test]
fn test_run_withMissingImage_shouldFail() -> Result<()> {
    let controller = mock_controller();

    let temp_dir = common::create_temp_dir()?;
    let script_path = common::create_test_script(&temp_dir.path().to_path_buf(), "walkthrough.txt")?;

    let result = tokio_test::block_on(controller.run(
        script_path,
        temp_dir.path().join("missing.png"),
        None,
        None,
        false,
    ));

    assert!(result.is_err());

    Ok(())
}

/// Test that folder mode rejects a directory without scripts
#[test]
fn test_runFolder_withNoScripts_shouldFail() -> Result<()> {
    let controller = mock_controller();

    let temp_dir = common::create_temp_dir()?;
    let image_path = common::create_test_file(&temp_dir.path().to_path_buf(), "background.png", "png bytes")?;
    let empty_dir = temp_dir.path().join("scripts");
    std::fs::create_dir_all(&empty_dir)?;

    let result = tokio_test::block_on(controller.run_folder(empty_dir, image_path, false));

    assert!(result.is_err());

    Ok(())
}

/// Test that folder mode rejects a missing directory
#[test]
fn test_runFolder_withMissingDirectory_shouldFail() -> Result<()> {
    let controller = mock_controller();

    let temp_dir = common::create_temp_dir()?;
    let image_path = common::create_test_file(&temp_dir.path().to_path_buf(), "background.png", "png bytes")?;

    let result = tokio_test::block_on(controller.run_folder(
        temp_dir.path().join("nowhere"),
        image_path,
        false,
    ));

    assert!(result.is_err());

    Ok(())
}
