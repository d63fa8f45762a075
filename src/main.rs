use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};

use stockroom::db::establish_connection_pool;
use stockroom::models::config::ServerConfig;
use stockroom::repository::DieselRepository;
use stockroom::routes::main::health;
use stockroom::routes::products::{
    create_product, destroy_product, get_product, list_products, list_trash, restore_product,
    soft_delete_product, update_product,
};
use stockroom::services::media::MediaStorage;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = config::Config::builder()
        .add_source(config::File::with_name("config").required(false))
        .add_source(config::Environment::with_prefix("STOCKROOM").separator("__"))
        .build()
        .and_then(|settings| settings.try_deserialize::<ServerConfig>())
        .unwrap_or_else(|e| {
            log::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        });

    let pool = establish_connection_pool(&config.database_url).unwrap_or_else(|e| {
        log::error!("Failed to establish database connection pool: {e}");
        std::process::exit(1);
    });
    let repo = DieselRepository::new(pool);

    let media = MediaStorage::new(&config.media.root, &config.media.public_path)?;
    let media_config = config.media.clone();

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(Cors::permissive())
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(media.clone()))
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(create_product)
                    .service(list_products)
                    .service(list_trash)
                    .service(get_product)
                    .service(update_product)
                    .service(soft_delete_product)
                    .service(restore_product)
                    .service(destroy_product),
            )
            .service(Files::new(&media_config.public_path, &media_config.root))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
