//! Multi-resource screen loaders
//!
//! Screens that need several records either fan out and join (one failure
//! fails the screen) or chain dependent fetches behind the parent record.

use tracing::debug;

use crate::client::ApiClient;
use crate::models::{Dispatcher, Driver, Load, Reference, Trailer, Truck};
use crate::utils::errors::AppResult;

/// Everything the driver edit form offers in its pickers
#[derive(Debug, Clone)]
pub struct DriverEditContext {
    pub driver: Driver,
    pub trucks: Vec<Truck>,
    pub trailers: Vec<Trailer>,
    pub dispatchers: Vec<Dispatcher>,
}

pub async fn driver_edit_context(client: &ApiClient, id: i64) -> AppResult<DriverEditContext> {
    let (driver, trucks, trailers, dispatchers) = futures::try_join!(
        client.fetch::<Driver>(id),
        client.list::<Truck>(),
        client.list::<Trailer>(),
        client.list::<Dispatcher>(),
    )?;

    Ok(DriverEditContext {
        driver,
        trucks,
        trailers,
        dispatchers,
    })
}

/// A load with its equipment and dispatcher resolved
#[derive(Debug, Clone)]
pub struct LoadDetail {
    pub load: Load,
    pub truck: Option<Truck>,
    pub trailer: Option<Trailer>,
    pub dispatcher: Option<Dispatcher>,
}

/// Embedded objects are used as they are; only bare ids trigger a fetch
async fn resolve<T>(client: &ApiClient, reference: Option<&Reference<T>>) -> AppResult<Option<T>>
where
    T: crate::models::Resource + Clone,
{
    match reference {
        None => Ok(None),
        Some(Reference::Object(record)) => Ok(Some(record.clone())),
        Some(Reference::Id(id)) => {
            debug!("Resolving {} {}", T::NAME, id);
            client.fetch::<T>(*id).await.map(Some)
        }
    }
}

pub async fn load_detail(client: &ApiClient, id: i64) -> AppResult<LoadDetail> {
    let load: Load = client.fetch(id).await?;

    let truck = resolve(client, load.truck.as_ref()).await?;
    let trailer = resolve(client, load.trailer.as_ref()).await?;
    let dispatcher = resolve(client, load.dispatcher.as_ref()).await?;

    Ok(LoadDetail {
        load,
        truck,
        trailer,
        dispatcher,
    })
}
