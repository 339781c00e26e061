use anyhow::Result;
use qnap_file_station::client::QnapBuilder;
use qnap_file_station::filestation::FileStation;
use std::env;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let qnap = QnapBuilder::from_env()?.build()?;
    qnap.authorize().await?;

    let station = FileStation::new(qnap);

    let shares = station.list_share().await?;
    for share in &shares {
        println!("share: {}, access: {:?}", share.id, share.cls);
    }

    let folder = env::args()
        .nth(1)
        .or_else(|| shares.first().map(|share| share.id.clone()));
    if let Some(folder) = folder {
        let listing = station.list(&folder).await?;
        println!("{folder}: {} entries", listing.total);
        for entry in listing.datas {
            println!(
                "{} {:>12} {} {}",
                if entry.is_folder() { "d" } else { "-" },
                entry.human_size(),
                entry.modified_display(),
                entry.filename
            );
        }
    }

    station.session().logout().await?;

    Ok(())
}
