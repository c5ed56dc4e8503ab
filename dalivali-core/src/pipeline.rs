use crate::{
    location::{Geolocator, resolve_location},
    model::Forecast,
    provider::{FetchError, PrecipitationSource},
    render::{Page, RainAnimator, RenderOptions, render},
};

/// Locate, fetch, render, once and in that order.
///
/// A failed fetch is returned as is and leaves the page untouched.
pub async fn check(
    geolocator: Option<&dyn Geolocator>,
    source: &dyn PrecipitationSource,
    page: &mut dyn Page,
    animator: &mut dyn RainAnimator,
    options: RenderOptions,
) -> Result<Forecast, FetchError> {
    let coordinates = resolve_location(geolocator).await;
    let forecast = source.fetch(coordinates).await?;

    render(&forecast, page, animator, options);
    Ok(forecast)
}
