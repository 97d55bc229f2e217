// src/ws.rs
//
// Admin-facing refetch channel. Backend change notifications arrive through
// the realtime consumer and fan out here as `{event: "refetch", table}`
// hints; a missed event only means the admin view stays stale until the
// next manual refresh.

use actix::{Actor, ActorContext, AsyncContext, Handler, Message, Recipient};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::api::auth;
use crate::AppState;

static NEXT_SESSION_ID: AtomicUsize = AtomicUsize::new(1);

#[derive(Message)]
#[rtype(result = "()")]
struct WsMessage(pub String);

#[derive(Message)]
#[rtype(result = "()")]
struct Connect {
    session_id: usize,
    addr: Recipient<WsMessage>,
}

#[derive(Message)]
#[rtype(result = "()")]
struct Disconnect {
    session_id: usize,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct TableChanged {
    pub table: String,
}

#[derive(Serialize)]
struct RefetchEvent<'a> {
    event: &'static str,
    table: &'a str,
}

pub struct EventHub {
    sessions: HashMap<usize, Recipient<WsMessage>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Actor for EventHub {
    type Context = actix::Context<Self>;
}

impl Handler<Connect> for EventHub {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Self::Context) -> Self::Result {
        self.sessions.insert(msg.session_id, msg.addr);
    }
}

impl Handler<Disconnect> for EventHub {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Self::Context) -> Self::Result {
        self.sessions.remove(&msg.session_id);
    }
}

impl Handler<TableChanged> for EventHub {
    type Result = ();

    fn handle(&mut self, msg: TableChanged, _: &mut Self::Context) -> Self::Result {
        let event = RefetchEvent {
            event: "refetch",
            table: &msg.table,
        };
        if let Ok(payload) = serde_json::to_string(&event) {
            for addr in self.sessions.values() {
                let _ = addr.do_send(WsMessage(payload.clone()));
            }
        }
    }
}

struct WsSession {
    session_id: usize,
    hub: actix::Addr<EventHub>,
}

impl WsSession {
    fn new(hub: actix::Addr<EventHub>) -> Self {
        Self {
            session_id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            hub,
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.hub.do_send(Connect {
            session_id: self.session_id,
            addr: ctx.address().recipient(),
        });
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        self.hub.do_send(Disconnect {
            session_id: self.session_id,
        });
    }
}

impl Handler<WsMessage> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: WsMessage, ctx: &mut Self::Context) -> Self::Result {
        ctx.text(msg.0);
    }
}

impl actix::StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, item: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match item {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(_) => {}
            Err(_) => ctx.stop(),
        }
    }
}

#[derive(Deserialize)]
struct WsQuery {
    token: String,
}

/// Upgrades an admin client to the refetch notification channel. The token
/// goes through the same identity-provider validation as API requests.
pub async fn events_ws(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let token = serde_urlencoded::from_str::<WsQuery>(req.query_string())
        .ok()
        .map(|q| q.token)
        .filter(|t| !t.is_empty());

    let Some(token) = token else {
        return Err(actix_web::error::ErrorUnauthorized("Missing token"));
    };

    let user = auth::validate_token(&state, &token).await?;
    auth::require_admin(&state, &user).await?;

    ws::start(WsSession::new(state.hub.clone()), &req, stream)
}
