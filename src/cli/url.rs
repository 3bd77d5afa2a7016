//! `cdnhost url`: print the rewritten reference for one asset.

use anyhow::Result;
use cdnhost::{RequestContext, RewriteResult, debug};

use super::{Cli, UrlArgs, common};

pub fn print_url(cli: &Cli, args: &UrlArgs) -> Result<()> {
    let host = common::build_host(cli, args.manifest.as_deref())?;

    let mut request = RequestContext::new();
    request.ssl = args.ssl;
    if args.gzip {
        request = request.with_accept_encoding("gzip");
    }
    if let Some(ua) = &args.user_agent {
        request = request.with_user_agent(ua.as_str());
    }

    let result = host.rewrite(&args.source, Some(&request), false)?;
    let kind = match &result {
        RewriteResult::Unchanged(_) => "unchanged",
        RewriteResult::Timestamped(_) => "timestamped",
        RewriteResult::Rewritten(_) => "rewritten",
    };
    debug!("url"; "{} {}", args.source, kind);
    println!("{result}");
    Ok(())
}
