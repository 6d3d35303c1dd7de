use actix_web::{Scope, web};

use super::{agents, auth, opportunities, search, users};

pub fn routes() -> Scope {
    web::scope("/api")
        .service(auth::routes())
        .service(users::routes())
        .service(opportunities::routes())
        .service(agents::routes())
        .service(search::routes())
}
