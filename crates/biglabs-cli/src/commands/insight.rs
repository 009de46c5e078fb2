use anyhow::Result;
use biglabs_application::AppBootstrap;
use colored::Colorize;

pub async fn run(app: &AppBootstrap, message: &str, context: Option<&str>) -> Result<()> {
    let answer = app.insights.generate(message, context).await?;

    if answer.preview {
        println!(
            "{}",
            "Preview answer: configure an Anthropic API key for live insights.".yellow()
        );
    }
    println!("{}", answer.response);
    Ok(())
}
