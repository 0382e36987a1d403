use async_trait::async_trait;
use thirtyfour::{
    error::{WebDriverError, WebDriverResult},
    By, ChromiumLikeCapabilities, DesiredCapabilities, WebDriver,
};

use crate::configuration::BrowserSettings;

use super::{BrowserSession, FetchError};

/// A Chrome session driven over WebDriver.
///
/// Acquired with [`Droid::launch`] and released with [`Droid::quit`]; the
/// session is owned by exactly one invocation.
pub struct Droid {
    pub driver: WebDriver,
}

impl Droid {
    pub async fn launch(settings: &BrowserSettings) -> WebDriverResult<Self> {
        let mut caps = DesiredCapabilities::chrome();
        for arg in settings.chrome_args() {
            caps.add_arg(arg)?;
        }

        let driver = WebDriver::new(&settings.webdriver_url, caps).await?;
        log::info!("Opened browser session on {}", settings.webdriver_url);

        Ok(Droid { driver })
    }

    pub async fn quit(self) -> WebDriverResult<()> {
        self.driver.quit().await?;
        log::info!("Closed browser session");
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for Droid {
    async fn navigate(&self, url: &str) -> Result<(), FetchError> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn is_element_visible(&self, element_id: &str) -> Result<bool, FetchError> {
        for element in self.driver.find_all(By::Id(element_id)).await? {
            if displayed(element.is_displayed().await)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn current_markup(&self) -> Result<String, FetchError> {
        Ok(self.driver.source().await?)
    }
}

/// An element that left the DOM between lookup and check is not displayed.
/// Any other WebDriver failure is passed up.
fn displayed(result: WebDriverResult<bool>) -> Result<bool, FetchError> {
    match result {
        Ok(displayed) => Ok(displayed),
        Err(WebDriverError::StaleElementReference(_) | WebDriverError::NoSuchElement(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
