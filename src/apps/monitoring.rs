//! Monitoring stack: Prometheus, Alertmanager and the exporters they scrape.

use crate::component::CatalogueApp;
use crate::target::TargetDescriptor;
use crate::template::{CustomAction, TemplateTable, UnitFile, write_file, write_file_verbatim};

// ============================================================================
// Prometheus
// ============================================================================

const PROMETHEUS_UNIT: UnitFile = UnitFile::service(
    "prometheus",
    "Prometheus TSDB",
    "/usr/local/bin/prometheus \
     --config.file=/etc/prometheus/prometheus.yml \
     --storage.tsdb.path=/data/prometheus \
     --web.external-url=https://prometheus.b2bi.dk \
     --storage.tsdb.retention.time=90d \
     --web.enable-lifecycle",
)
.network_online()
.restart("on-failure", None)
.user("prometheus")
.group("prometheus");

const PROMETHEUS_CONFIG: &str = r#"global:
  scrape_interval: 60s
  evaluation_interval: 60s

alerting:
  alertmanagers:
    - static_configs:
        - targets:
           - localhost:9093

rule_files:

scrape_configs:
  - job_name: "prometheus"
    static_configs:
      - targets: ["localhost:9090"]
        labels:
          app: "prometheus"
"#;

fn prometheus_unit(_: &TargetDescriptor) -> String {
    PROMETHEUS_UNIT.render()
}

fn prometheus_config(_: &TargetDescriptor) -> String {
    write_file("/etc/prometheus/prometheus.yml", PROMETHEUS_CONFIG)
}

pub const PROMETHEUS: CatalogueApp = CatalogueApp {
    name: "prometheus",
    description: "Prometheus time series database",
    install: &[
        "wget -q https://github.com/prometheus/prometheus/releases/download/v3.5.0/prometheus-3.5.0.linux-amd64.tar.gz",
        "tar -xvzf prometheus-3.5.0.linux-amd64.tar.gz",
        "cd prometheus-3.5.0.linux-amd64 && mv prometheus promtool /usr/local/bin/",
        "mkdir -p /etc/prometheus",
        "CUSTOM: CreateConfigFile",
        "mkdir -p /data/prometheus",
        "useradd -M -r -s /bin/false prometheus",
        "chown -R prometheus:prometheus /data/prometheus /etc/prometheus",
        "CUSTOM: CreateUnitFile",
        "systemctl daemon-reload",
        "systemctl enable --now prometheus",
    ],
    update: &["systemctl daemon-reload", "systemctl restart prometheus"],
    secondary_on_install: false,
    templates: TemplateTable::new(&[
        (CustomAction::CreateUnitFile, prometheus_unit),
        (CustomAction::CreateConfigFile, prometheus_config),
    ]),
};

// ============================================================================
// Alertmanager
// ============================================================================

const ALERTMANAGER_UNIT: UnitFile = UnitFile::service(
    "alertmanager",
    "Prometheus Alertmanager",
    "/usr/local/bin/alertmanager \
     --config.file=/etc/alertmanager/alertmanager.yml \
     --storage.path=/var/lib/alertmanager \
     --web.external-url=https://alertmanager.b2bi.dk",
)
.network_online()
.restart("on-failure", None)
.user("alertmanager")
.group("alertmanager");

const ALERTMANAGER_CONFIG: &str = r#"global:
  pagerduty_url: 'https://events.pagerduty.com/v2/enqueue'
  smtp_require_tls: false
  smtp_smarthost: 'smtp.b2bi.dk:25'
  smtp_from: 'alertmanager@truecommerce.com'

route:
  group_by: ['alertname','instance']
  group_interval: 5m
  repeat_interval: 120h

  receiver: default

  routes:
  - matchers:
    - severity = critical
    - notify = servicedesk
    receiver: netsuite_servicedesk

  - matchers:
    - severity = none
    group_wait: 0s
    group_interval: 1m
    repeat_interval: 5m
    receiver: none.dead.man.snitch

receivers:
- name: netsuite_servicedesk
  email_configs:
   - to: 'servicedesk@truecommerce.com'

- name: none.dead.man.snitch

- name: default

inhibit_rules:
"#;

fn alertmanager_unit(_: &TargetDescriptor) -> String {
    ALERTMANAGER_UNIT.render()
}

fn alertmanager_config(_: &TargetDescriptor) -> String {
    write_file("/etc/alertmanager/alertmanager.yml", ALERTMANAGER_CONFIG)
}

pub const ALERTMANAGER: CatalogueApp = CatalogueApp {
    name: "alertmanager",
    description: "Prometheus Alertmanager",
    install: &[
        "wget -q https://github.com/prometheus/alertmanager/releases/download/v0.28.1/alertmanager-0.28.1.linux-amd64.tar.gz",
        "tar -xvzf alertmanager-0.28.1.linux-amd64.tar.gz",
        "cd alertmanager-0.28.1.linux-amd64 && mv alertmanager amtool /usr/local/bin/",
        "mkdir -p /etc/alertmanager",
        "CUSTOM: CreateConfigFile",
        "mkdir -p /var/lib/alertmanager",
        "useradd -M -r -s /bin/false alertmanager",
        "chown -R alertmanager:alertmanager /var/lib/alertmanager /etc/alertmanager",
        "CUSTOM: CreateUnitFile",
        "systemctl daemon-reload",
        "systemctl enable --now alertmanager",
    ],
    update: &["systemctl daemon-reload", "systemctl restart alertmanager"],
    secondary_on_install: false,
    templates: TemplateTable::new(&[
        (CustomAction::CreateUnitFile, alertmanager_unit),
        (CustomAction::CreateConfigFile, alertmanager_config),
    ]),
};

// ============================================================================
// Node exporter
// ============================================================================

const NODE_EXPORTER_UNIT: UnitFile = UnitFile::service(
    "node_exporter",
    "Node Exporter",
    "/usr/local/bin/node_exporter --collector.logind --collector.systemd --web.listen-address=:9182",
)
.network_online()
.start_limit("500", Some(5))
.restart("on-failure", Some("5s"));

fn node_exporter_unit(_: &TargetDescriptor) -> String {
    NODE_EXPORTER_UNIT.render()
}

pub const NODE_EXPORTER: CatalogueApp = CatalogueApp {
    name: "nodeexp",
    description: "Prometheus node exporter",
    install: &[
        "wget -q https://github.com/prometheus/node_exporter/releases/download/v1.10.2/node_exporter-1.10.2.linux-amd64.tar.gz",
        "tar -xvf node_exporter-1.10.2.linux-amd64.tar.gz",
        "cd node_exporter-1.10.2.linux-amd64 && mv node_exporter /usr/local/bin/",
        "CUSTOM: CreateUnitFile",
        "systemctl daemon-reload",
        "systemctl enable --now node_exporter.service",
    ],
    update: &[
        "CUSTOM: CreateUnitFile",
        "systemctl daemon-reload",
        "systemctl restart node_exporter.service",
    ],
    secondary_on_install: false,
    templates: TemplateTable::new(&[(CustomAction::CreateUnitFile, node_exporter_unit)]),
};

// ============================================================================
// F5 LTM exporter
// ============================================================================

/// Holds the F5 monitoring account, filled from the secondary credentials.
const F5_ENV_FILE: &str = "/etc/default/f5ltm_exporter";

// `\$` keeps the heredoc from expanding the variables at write time.
const F5_EXPORTER_UNIT: UnitFile = UnitFile::service(
    "f5ltm_exporter",
    "F5 LTM Exporter Service",
    "/opt/f5ltm_exporter/f5ltmexporterserver \
     --f5-user=\\${F5_USER} --f5-pass=\\${F5_PASS} --tls-skip-verify=true",
)
.start_limit("0", None)
.restart("always", Some("1"))
.user("root")
.working_directory("/opt/f5ltm_exporter")
.environment_file("-/etc/default/f5ltm_exporter");

fn f5_exporter_unit(_: &TargetDescriptor) -> String {
    F5_EXPORTER_UNIT.render()
}

fn f5_exporter_env(target: &TargetDescriptor) -> String {
    write_file_verbatim(
        F5_ENV_FILE,
        &format!(
            "F5_USER={}\nF5_PASS={}\n",
            target.secondary_user(),
            target.secondary_secret()
        ),
    )
}

pub const F5_EXPORTER: CatalogueApp = CatalogueApp {
    name: "f5exporter",
    description: "F5 LTM Prometheus exporter",
    install: &[
        "cd /opt && sudo git clone https://github.com/TRUECOMMERCEDK/f5ltm_exporter.git",
        "cd /opt/f5ltm_exporter && sudo make build",
        "CUSTOM: CreateEnvFile",
        "sudo chmod 600 /etc/default/f5ltm_exporter",
        "CUSTOM: CreateUnitFile",
        "sudo systemctl daemon-reload",
        "sudo systemctl enable --now f5ltm_exporter.service",
    ],
    update: &[
        "sudo systemctl stop f5ltm_exporter.service",
        "git -C /opt/f5ltm_exporter fetch origin main",
        "git -C /opt/f5ltm_exporter reset --hard origin/main",
        "cd /opt/f5ltm_exporter && sudo make build",
        "CUSTOM: CreateUnitFile",
        "sudo systemctl daemon-reload",
        "sudo systemctl restart f5ltm_exporter.service",
    ],
    secondary_on_install: true,
    templates: TemplateTable::new(&[
        (CustomAction::CreateUnitFile, f5_exporter_unit),
        (CustomAction::CreateEnvFile, f5_exporter_env),
    ]),
};
